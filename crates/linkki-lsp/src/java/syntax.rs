//! Typed view over a tree-sitter Java syntax tree
//!
//! The tree is walked once and turned into owned declarations carrying byte
//! spans, so callers never hold on to tree-sitter nodes.

use tree_sitter::{Node, Parser};

use super::naming::property_name;
use super::{SyntaxError, SyntaxResult};

/// Byte span inside the parsed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte (inclusive)
    pub start: usize,
    /// End byte (exclusive)
    pub end: usize,
}

impl Span {
    fn of(node: Node<'_>) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
        }
    }

    /// Whether `offset` lies within the span (end inclusive, like an editor caret)
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// An annotation by its simple name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Simple name (`UITextField` for `@org.linkki.UITextField(...)`)
    pub name: String,
    /// Span of the whole annotation
    pub span: Span,
}

/// Declarations that may carry annotations
pub trait Annotated {
    /// Annotations in source order
    fn annotations(&self) -> &[Annotation];

    /// Whether an annotation's simple name starts with `prefix`
    fn has_annotation_with_prefix(&self, prefix: &str) -> bool {
        self.annotations()
            .iter()
            .any(|annotation| annotation.name.starts_with(prefix))
    }
}

/// Kind of type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
}

impl TypeKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            "annotation_type_declaration" => Some(TypeKind::AnnotationType),
            _ => None,
        }
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    /// Whole declaration including annotations and body
    pub span: Span,
    pub name_span: Span,
    /// Start of the declaration including comments directly above it
    pub leading_start: usize,
    pub annotations: Vec<Annotation>,
}

impl MethodDecl {
    /// Property name bound by this method
    pub fn property_name(&self) -> String {
        property_name(&self.name)
    }
}

impl Annotated for MethodDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A field declaration, named by its first declarator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub span: Span,
    pub name_span: Span,
    pub annotations: Vec<Annotation>,
}

impl Annotated for FieldDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A type declaration with its direct members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub span: Span,
    pub name_span: Span,
    /// Span of the body from `{` through `}`
    pub body: Option<Span>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    /// Member types declared in the body
    pub nested: Vec<TypeDecl>,
}

impl Annotated for TypeDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl TypeDecl {
    /// Innermost method of this type or its member types containing `offset`
    pub fn method_at(&self, offset: usize) -> Option<(&TypeDecl, &MethodDecl)> {
        if !self.span.contains(offset) {
            return None;
        }
        self.nested
            .iter()
            .find_map(|nested| nested.method_at(offset))
            .or_else(|| {
                self.methods
                    .iter()
                    .find(|method| method.span.contains(offset))
                    .map(|method| (self, method))
            })
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a TypeDecl>) {
        out.push(self);
        for nested in &self.nested {
            nested.collect(out);
        }
    }
}

/// A parsed compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaFile {
    /// Top-level type declarations in source order
    pub types: Vec<TypeDecl>,
}

impl JavaFile {
    /// Parse Java source text
    ///
    /// Text with any syntax error is rejected as a whole.
    pub fn parse(text: &str) -> SyntaxResult<Self> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| SyntaxError::Language(e.to_string()))?;
        let tree = parser.parse(text, None).ok_or(SyntaxError::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error(root)
                .map(|node| node.start_position())
                .unwrap_or_else(|| root.start_position());
            return Err(SyntaxError::Malformed {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let source = text.as_bytes();
        let mut cursor = root.walk();
        let types = root
            .named_children(&mut cursor)
            .filter_map(|node| type_decl(node, source))
            .collect();

        Ok(Self { types })
    }

    /// All type declarations, outer types before their member types
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        let mut out = Vec::new();
        for decl in &self.types {
            decl.collect(&mut out);
        }
        out
    }

    /// All methods in source order with their declaring type
    pub fn methods(&self) -> Vec<(&TypeDecl, &MethodDecl)> {
        let mut methods: Vec<(&TypeDecl, &MethodDecl)> = self
            .all_types()
            .into_iter()
            .flat_map(|decl| decl.methods.iter().map(move |method| (decl, method)))
            .collect();
        methods.sort_by_key(|(_, method)| method.span.start);
        methods
    }

    /// Innermost method containing `offset`
    pub fn method_at(&self, offset: usize) -> Option<(&TypeDecl, &MethodDecl)> {
        self.types.iter().find_map(|decl| decl.method_at(offset))
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn type_decl(node: Node<'_>, source: &[u8]) -> Option<TypeDecl> {
    let kind = TypeKind::from_node_kind(node.kind())?;
    let name = node.child_by_field_name("name")?;
    let body = node.child_by_field_name("body");

    let mut decl = TypeDecl {
        name: node_text(name, source).to_string(),
        kind,
        span: Span::of(node),
        name_span: Span::of(name),
        body: body.map(Span::of),
        annotations: annotations(node, source),
        fields: Vec::new(),
        methods: Vec::new(),
        nested: Vec::new(),
    };

    if let Some(body) = body {
        collect_members(body, source, &mut decl);
    }
    Some(decl)
}

fn collect_members(body: Node<'_>, source: &[u8], decl: &mut TypeDecl) {
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "method_declaration" => {
                if let Some(method) = method_decl(member, source) {
                    decl.methods.push(method);
                }
            }
            "field_declaration" | "constant_declaration" => {
                if let Some(field) = field_decl(member, source) {
                    decl.fields.push(field);
                }
            }
            // enum constants are followed by an ordinary member list
            "enum_body_declarations" => collect_members(member, source, decl),
            _ => {
                if let Some(nested) = type_decl(member, source) {
                    decl.nested.push(nested);
                }
            }
        }
    }
}

fn method_decl(node: Node<'_>, source: &[u8]) -> Option<MethodDecl> {
    let name = node.child_by_field_name("name")?;
    Some(MethodDecl {
        name: node_text(name, source).to_string(),
        span: Span::of(node),
        name_span: Span::of(name),
        leading_start: leading_start(node, source),
        annotations: annotations(node, source),
    })
}

fn field_decl(node: Node<'_>, source: &[u8]) -> Option<FieldDecl> {
    let declarator = node.child_by_field_name("declarator")?;
    let name = declarator.child_by_field_name("name")?;
    Some(FieldDecl {
        name: node_text(name, source).to_string(),
        span: Span::of(node),
        name_span: Span::of(name),
        annotations: annotations(node, source),
    })
}

fn annotations(node: Node<'_>, source: &[u8]) -> Vec<Annotation> {
    let mut cursor = node.walk();
    let Some(modifiers) = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers")
    else {
        return Vec::new();
    };

    let mut cursor = modifiers.walk();
    let found = modifiers
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "marker_annotation" | "annotation"))
        .filter_map(|annotation| {
            let name = annotation.child_by_field_name("name")?;
            let qualified = node_text(name, source);
            let simple = qualified.rsplit('.').next().unwrap_or(qualified);
            Some(Annotation {
                name: simple.trim().to_string(),
                span: Span::of(annotation),
            })
        })
        .collect();
    found
}

/// Start of the comments that sit on their own lines directly above `node`
fn leading_start(node: Node<'_>, source: &[u8]) -> usize {
    let mut start = node.start_byte();
    let mut current = node;
    while let Some(previous) = current.prev_named_sibling() {
        let is_comment = matches!(previous.kind(), "line_comment" | "block_comment");
        if !is_comment || !starts_line(source, previous.start_byte()) {
            break;
        }
        start = previous.start_byte();
        current = previous;
    }
    start
}

fn starts_line(source: &[u8], offset: usize) -> bool {
    source[..offset]
        .iter()
        .rev()
        .take_while(|b| **b != b'\n')
        .all(|b| *b == b' ' || *b == b'\t' || *b == b'\r')
}
