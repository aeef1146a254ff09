//! Project layout conventions
//!
//! Maps between the source tree and the resource tree of a Maven-style
//! project: `<project>/src/main/java/org/example/Foo.java` mirrors
//! `<project>/src/main/resources/org/example/`.

use std::path::{Component, Path, PathBuf};

use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::ServerConfig;

/// Directory conventions derived from the server configuration
#[derive(Debug, Clone, Copy)]
pub struct ProjectLayout<'a> {
    config: &'a ServerConfig,
}

/// A file located under one of the two roots
struct Located {
    project_root: PathBuf,
    package_dir: PathBuf,
}

impl<'a> ProjectLayout<'a> {
    /// Create a layout view over a configuration
    pub fn new(config: &'a ServerConfig) -> Self {
        Self { config }
    }

    /// Resource directory mirroring the package of a source file
    pub fn mirrored_resource_dir(&self, source_file: &Path) -> Option<PathBuf> {
        let located = locate(source_file, &self.config.source_root)?;
        let mut dir = join_root(&located.project_root, &self.config.resource_root);
        dir.extend(located.package_dir.components());
        Some(dir)
    }

    /// Top-level resource directory of the project containing a source file
    pub fn root_resource_dir(&self, source_file: &Path) -> Option<PathBuf> {
        let located = locate(source_file, &self.config.source_root)?;
        Some(join_root(&located.project_root, &self.config.resource_root))
    }

    /// Source directory mirroring the package of a resource file
    pub fn mirrored_source_dir(&self, resource_file: &Path) -> Option<PathBuf> {
        let located = locate(resource_file, &self.config.resource_root)?;
        let mut dir = join_root(&located.project_root, &self.config.source_root);
        dir.extend(located.package_dir.components());
        Some(dir)
    }

    /// Source root of the project containing a resource file
    pub fn source_root_for(&self, resource_file: &Path) -> Option<PathBuf> {
        let located = locate(resource_file, &self.config.resource_root)?;
        Some(join_root(&located.project_root, &self.config.source_root))
    }

    /// Path of a qualified class name (`org.example.Foo`) under a source root
    pub fn qualified_source_path(&self, source_root: &Path, class_name: &str) -> PathBuf {
        let mut path = source_root.to_path_buf();
        for segment in class_name.split('.') {
            path.push(segment);
        }
        path.set_extension(&self.config.source_extension);
        path
    }

    /// First source file named after a simple class name, searched recursively
    pub fn find_source_file(&self, source_root: &Path, simple_name: &str) -> Option<PathBuf> {
        let target = format!("{}.{}", simple_name, self.config.source_extension);
        WalkDir::new(source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable path under {}: {}", source_root.display(), e);
                    None
                }
            })
            .find(|entry| entry.file_type().is_file() && entry.file_name().to_str() == Some(target.as_str()))
            .map(|entry| entry.into_path())
    }

    /// Source files directly inside a directory, sorted by name
    pub fn source_files(&self, dir: &Path) -> Vec<PathBuf> {
        list_files(dir, &self.config.source_extension)
    }

    /// Resource files directly inside a directory, sorted by name
    pub fn resource_files(&self, dir: &Path) -> Vec<PathBuf> {
        list_files(dir, &self.config.resource_extension)
    }

    /// Whether a resource file name follows the bundle convention
    /// (`messages.properties`, `messages_de.properties`, `messages_de_AT.properties`)
    pub fn is_bundle_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let bases = self
            .config
            .bundle_base_names
            .iter()
            .map(|base| regex::escape(base))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"^(?:{})(?:_[a-zA-Z]{{2}}(?:_[a-zA-Z]{{2}})?)?\.{}$",
            bases,
            regex::escape(&self.config.resource_extension)
        );
        match Regex::new(&pattern) {
            Ok(re) => re.is_match(file_name),
            Err(e) => {
                warn!("Invalid bundle name pattern {}: {}", pattern, e);
                false
            }
        }
    }
}

fn join_root(project_root: &Path, root: &str) -> PathBuf {
    let mut path = project_root.to_path_buf();
    for segment in root.split('/').filter(|segment| !segment.is_empty()) {
        path.push(segment);
    }
    path
}

/// Split a file path at the first occurrence of `root` (a `/`-separated relative path)
fn locate(file: &Path, root: &str) -> Option<Located> {
    let root: Vec<&str> = root.split('/').filter(|segment| !segment.is_empty()).collect();
    let components: Vec<Component<'_>> = file.components().collect();
    if root.is_empty() || components.len() <= root.len() {
        return None;
    }

    let start = (0..components.len() - root.len()).find(|&idx| {
        root.iter()
            .zip(&components[idx..idx + root.len()])
            .all(|(segment, component)| component.as_os_str() == *segment)
    })?;

    let project_root: PathBuf = components[..start].iter().collect();
    let package_dir: PathBuf = components[start + root.len()..components.len() - 1]
        .iter()
        .collect();
    Some(Located {
        project_root,
        package_dir,
    })
}

fn list_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_config() -> ServerConfig {
        ServerConfig::default()
    }

    #[test]
    fn test_mirrored_dirs() {
        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        let source = Path::new("/work/shop/src/main/java/org/example/OrderPmo.java");

        assert_eq!(
            layout.mirrored_resource_dir(source).unwrap(),
            PathBuf::from("/work/shop/src/main/resources/org/example")
        );
        assert_eq!(
            layout.root_resource_dir(source).unwrap(),
            PathBuf::from("/work/shop/src/main/resources")
        );

        let resource = Path::new("/work/shop/src/main/resources/org/example/messages.properties");
        assert_eq!(
            layout.mirrored_source_dir(resource).unwrap(),
            PathBuf::from("/work/shop/src/main/java/org/example")
        );
        assert_eq!(
            layout.source_root_for(resource).unwrap(),
            PathBuf::from("/work/shop/src/main/java")
        );
    }

    #[test]
    fn test_default_package() {
        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        let source = Path::new("/p/src/main/java/Foo.java");
        assert_eq!(
            layout.mirrored_resource_dir(source),
            layout.root_resource_dir(source)
        );
    }

    #[test]
    fn test_outside_layout() {
        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        assert!(layout.mirrored_resource_dir(Path::new("/tmp/Foo.java")).is_none());
        assert!(layout.source_root_for(Path::new("/tmp/messages.properties")).is_none());
    }

    #[test]
    fn test_qualified_source_path() {
        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        assert_eq!(
            layout.qualified_source_path(Path::new("/p/src/main/java"), "org.example.OrderPmo"),
            PathBuf::from("/p/src/main/java/org/example/OrderPmo.java")
        );
    }

    #[test]
    fn test_bundle_file_names() {
        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        assert!(layout.is_bundle_file(Path::new("/r/messages.properties")));
        assert!(layout.is_bundle_file(Path::new("/r/messages_de.properties")));
        assert!(layout.is_bundle_file(Path::new("/r/linkki-messages_de_AT.properties")));
        assert!(!layout.is_bundle_file(Path::new("/r/application.properties")));
        assert!(!layout.is_bundle_file(Path::new("/r/messages_deutsch.properties")));
        assert!(!layout.is_bundle_file(Path::new("/r/messages.txt")));
    }

    #[test]
    fn test_find_and_list_files() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("org/example");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("B.java"), "class B {}").unwrap();
        std::fs::write(package.join("A.java"), "class A {}").unwrap();
        std::fs::write(package.join("notes.txt"), "").unwrap();

        let config = layout_config();
        let layout = ProjectLayout::new(&config);
        assert_eq!(
            layout.find_source_file(dir.path(), "B").unwrap(),
            package.join("B.java")
        );
        assert!(layout.find_source_file(dir.path(), "C").is_none());

        let files = layout.source_files(&package);
        assert_eq!(files, vec![package.join("A.java"), package.join("B.java")]);
        assert!(layout.resource_files(&package).is_empty());
    }
}
