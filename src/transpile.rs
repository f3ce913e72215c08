//! Script transpilation: JSX/TSX component source → plain script.
//!
//! The execution target is a bare `<script>` tag inside the assembled
//! preview document — no module loader, no bundler runtime. React and
//! ReactDOM exist as pre-loaded globals, so:
//!
//! - imports of the runtime modules are stripped, never rewritten;
//! - JSX lowers to classic `React.createElement(...)` factory calls with no
//!   automatic runtime import;
//! - TypeScript-only constructs are erased best-effort;
//! - a component named exactly `App` is published onto `window` so the
//!   assembler's mount snippet can find it.
//!
//! A parse error anywhere in the file is fatal for the file (and the
//! pipeline run): there is no partial output.

use oxc_allocator::{Allocator, Box as oxc_box, CloneIn};
use oxc_ast::ast::*;
use oxc_ast::AstBuilder;
use oxc_ast_visit::walk_mut::walk_expression;
use oxc_ast_visit::VisitMut;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::{SourceType, SPAN};

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::engine::{compiler_config, CompilerConfig, CompilerInitError};
use crate::escape::unescape_literal;

/// Statement appended when the source defines the entry component.
const APP_PUBLISH: &str = "window.App = App;";

/// Errors that abort transpilation of one file.
#[derive(Debug, Clone)]
pub enum TranspileError {
    /// The source did not parse; carries the original parser diagnostic.
    Parse { diagnostic: String },
    /// The shared engine never became ready.
    Init(CompilerInitError),
}

impl std::fmt::Display for TranspileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { diagnostic } => write!(f, "Parse error: {}", diagnostic),
            Self::Init(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TranspileError {}

/// Transpile one component file's raw source into plain-script text.
///
/// Waits for the shared engine configuration on first use; the input may
/// still carry literal escape artifacts and gets a defensive decode pass.
pub async fn transpile(raw: &str) -> Result<String, TranspileError> {
    let config = compiler_config().await.map_err(TranspileError::Init)?;
    let source = unescape_literal(raw);

    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_typescript(true)
        .with_jsx(true)
        .with_module(true);

    let ret = Parser::new(&allocator, &source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let diagnostic = ret
            .errors
            .first()
            .map(|e| format!("{:?}", e))
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(TranspileError::Parse { diagnostic });
    }

    let mut program = ret.program;
    let ast = AstBuilder::new(&allocator);

    // Strip runtime imports and unwrap export statements so the emitted
    // text has a flat, script-compatible shape.
    let mut body = ast.vec();
    for stmt in program.body {
        match stmt {
            Statement::ImportDeclaration(import_decl) => {
                if !is_stripped_import(&import_decl, config) {
                    body.push(Statement::ImportDeclaration(import_decl));
                }
            }
            Statement::ExportNamedDeclaration(mut export) => {
                if let Some(declaration) = export.declaration.take() {
                    body.push(Statement::from(declaration));
                }
                // Specifier-only re-exports have no script meaning; dropped.
            }
            Statement::ExportDefaultDeclaration(export) => {
                match export.unbox().declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        body.push(Statement::FunctionDeclaration(func));
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        body.push(Statement::ClassDeclaration(class));
                    }
                    _ => {}
                }
            }
            other => body.push(other),
        }
    }
    program.body = body;
    program.body.retain(|stmt| !is_ts_statement(stmt));

    let mut lowerer = ClassicJsxLowerer::new(&allocator, config);
    lowerer.visit_program(&mut program);

    let mut code = Codegen::new().build(&program).code;

    // Auto-mount contract: the assembler's mount snippet looks for a global
    // `App`, so publish it when the file defines one.
    if code.contains("function App(") {
        if !code.ends_with('\n') {
            code.push('\n');
        }
        code.push_str(APP_PUBLISH);
        code.push('\n');
    }

    Ok(code)
}

/// True for imports of the runtime modules, matched by source
/// (`react`, `react-dom`) or by default/namespace bindings of the runtime
/// globals (`React`, `ReactDOM`).
fn is_stripped_import(import_decl: &ImportDeclaration<'_>, config: &CompilerConfig) -> bool {
    let source = import_decl.source.value.as_str();
    if config.stripped_sources.contains(&source) {
        return true;
    }
    if let Some(specifiers) = &import_decl.specifiers {
        for specifier in specifiers {
            let local = match specifier {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => s.local.name.as_str(),
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => s.local.name.as_str(),
                ImportDeclarationSpecifier::ImportSpecifier(_) => continue,
            };
            if config.runtime_globals.contains(&local) {
                return true;
            }
        }
    }
    false
}

fn is_ts_statement(stmt: &Statement<'_>) -> bool {
    matches!(
        stmt,
        Statement::TSTypeAliasDeclaration(_)
            | Statement::TSInterfaceDeclaration(_)
            | Statement::TSEnumDeclaration(_)
            | Statement::TSModuleDeclaration(_)
            | Statement::TSImportEqualsDeclaration(_)
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIC JSX LOWERER
// Rewrites JSX elements into React.createElement(tag, props, ...children)
// ═══════════════════════════════════════════════════════════════════════════════

struct ClassicJsxLowerer<'a> {
    ast: AstBuilder<'a>,
    factory_path: Vec<&'static str>,
    fragment_path: Vec<&'static str>,
}

impl<'a> ClassicJsxLowerer<'a> {
    fn new(allocator: &'a Allocator, config: &CompilerConfig) -> Self {
        Self {
            ast: AstBuilder::new(allocator),
            factory_path: config.factory_path(),
            fragment_path: config.fragment_path(),
        }
    }

    /// Build `a.b.c` from identifier segments.
    fn path_expression(&self, path: &[&str]) -> Expression<'a> {
        let mut segments = path.iter();
        let root = self.ast.allocator.alloc_str(segments.next().copied().unwrap_or(""));
        let mut expr = self.ast.expression_identifier(SPAN, root);
        for segment in segments {
            let atom = self.ast.allocator.alloc_str(segment);
            expr = Expression::from(self.ast.member_expression_static(
                SPAN,
                expr,
                self.ast.identifier_name(SPAN, atom),
                false,
            ));
        }
        expr
    }

    fn factory_call(
        &self,
        tag: Expression<'a>,
        props: Expression<'a>,
        children: oxc_allocator::Vec<'a, Expression<'a>>,
    ) -> Expression<'a> {
        let mut args = self.ast.vec();
        args.push(Argument::from(tag));
        args.push(Argument::from(props));
        for child in children {
            args.push(Argument::from(child));
        }
        self.ast.expression_call(
            SPAN,
            self.path_expression(&self.factory_path),
            None::<oxc_box<TSTypeParameterInstantiation>>,
            args,
            false,
        )
    }

    /// Intrinsic tags (`div`) become string literals; capitalized tags
    /// (`Card`, `Card.Header`) become identifier/member references so the
    /// factory receives the component value itself.
    fn tag_expression(&self, name: &JSXElementName<'a>) -> Expression<'a> {
        let tag = self.tag_name(name);
        let is_component = tag.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if is_component {
            let parts: Vec<&str> = tag.split('.').collect();
            self.path_expression(&parts)
        } else {
            let atom = self.ast.allocator.alloc_str(&tag);
            self.ast.expression_string_literal(SPAN, atom, None)
        }
    }

    fn tag_name(&self, name: &JSXElementName<'a>) -> String {
        match name {
            JSXElementName::Identifier(id) => id.name.to_string(),
            JSXElementName::IdentifierReference(id) => id.name.to_string(),
            JSXElementName::NamespacedName(ns) => format!("{}:{}", ns.namespace.name, ns.name.name),
            JSXElementName::MemberExpression(me) => self.member_name(me),
            JSXElementName::ThisExpression(_) => "this".to_string(),
        }
    }

    fn member_name(&self, me: &JSXMemberExpression<'a>) -> String {
        let object = match &me.object {
            JSXMemberExpressionObject::IdentifierReference(id) => id.name.to_string(),
            JSXMemberExpressionObject::MemberExpression(inner) => self.member_name(inner),
            _ => "this".to_string(),
        };
        format!("{}.{}", object, me.property.name)
    }

    fn property_key(&self, name: &str) -> PropertyKey<'a> {
        let atom = self.ast.allocator.alloc_str(name);
        if is_valid_identifier(name) {
            PropertyKey::StaticIdentifier(self.ast.alloc(self.ast.identifier_name(SPAN, atom)))
        } else {
            // data-* and namespaced attributes need a quoted key.
            PropertyKey::StringLiteral(self.ast.alloc_string_literal(SPAN, atom, None))
        }
    }

    fn lower_jsx_element(&mut self, element: &JSXElement<'a>) -> Expression<'a> {
        let tag = self.tag_expression(&element.opening_element.name);

        let mut props = self.ast.vec();
        for item in &element.opening_element.attributes {
            match item {
                JSXAttributeItem::Attribute(attr) => {
                    let key = match &attr.name {
                        JSXAttributeName::Identifier(id) => self.property_key(&id.name),
                        JSXAttributeName::NamespacedName(ns) => {
                            let joined = format!("{}:{}", ns.namespace.name, ns.name.name);
                            self.property_key(&joined)
                        }
                    };
                    let value = match &attr.value {
                        Some(JSXAttributeValue::StringLiteral(s)) => {
                            Expression::StringLiteral(self.ast.alloc((**s).clone()))
                        }
                        Some(JSXAttributeValue::Element(el)) => self.lower_jsx_element(el),
                        Some(JSXAttributeValue::Fragment(frag)) => self.lower_jsx_fragment(frag),
                        Some(JSXAttributeValue::ExpressionContainer(container)) => {
                            self.lower_contained_expression(&container.expression)
                        }
                        None => self.ast.expression_boolean_literal(SPAN, true),
                    };
                    props.push(self.ast.object_property_kind_object_property(
                        SPAN,
                        PropertyKind::Init,
                        key,
                        value,
                        false,
                        false,
                        false,
                    ));
                }
                JSXAttributeItem::SpreadAttribute(spread) => {
                    let mut spread_expr = spread.argument.clone_in(self.ast.allocator);
                    self.visit_expression(&mut spread_expr);
                    props.push(
                        self.ast
                            .object_property_kind_spread_property(SPAN, spread_expr),
                    );
                }
            }
        }

        let props_expr = if props.is_empty() {
            self.ast.expression_null_literal(SPAN)
        } else {
            self.ast.expression_object(SPAN, props)
        };

        let children = self.lower_children(&element.children);
        self.factory_call(tag, props_expr, children)
    }

    fn lower_jsx_fragment(&mut self, fragment: &JSXFragment<'a>) -> Expression<'a> {
        let tag = self.path_expression(&self.fragment_path);
        let props = self.ast.expression_null_literal(SPAN);
        let children = self.lower_children(&fragment.children);
        self.factory_call(tag, props, children)
    }

    fn lower_children(
        &mut self,
        children: &oxc_allocator::Vec<'a, JSXChild<'a>>,
    ) -> oxc_allocator::Vec<'a, Expression<'a>> {
        let mut out = self.ast.vec();
        for child in children {
            match child {
                JSXChild::Text(t) => {
                    let text = t.value.trim();
                    if !text.is_empty() {
                        let atom = self.ast.allocator.alloc_str(text);
                        out.push(self.ast.expression_string_literal(SPAN, atom, None));
                    }
                }
                JSXChild::Element(el) => out.push(self.lower_jsx_element(el)),
                JSXChild::Fragment(frag) => out.push(self.lower_jsx_fragment(frag)),
                JSXChild::ExpressionContainer(container) => {
                    // Comment-only containers carry no expression; skip them.
                    if container.expression.as_expression().is_some() {
                        out.push(self.lower_contained_expression(&container.expression));
                    }
                }
                JSXChild::Spread(spread) => {
                    let mut arg = spread.expression.clone_in(self.ast.allocator);
                    self.visit_expression(&mut arg);
                    out.push(arg);
                }
            }
        }
        out
    }

    fn lower_contained_expression(&mut self, jsx_expr: &JSXExpression<'a>) -> Expression<'a> {
        if let Some(mut e) = jsx_expr
            .as_expression()
            .map(|e| e.clone_in(self.ast.allocator))
        {
            self.visit_expression(&mut e);
            e
        } else {
            self.ast.expression_identifier(SPAN, "undefined")
        }
    }
}

impl<'a> VisitMut<'a> for ClassicJsxLowerer<'a> {
    fn visit_expression(&mut self, expr: &mut Expression<'a>) {
        // TypeScript erasure first, so the wrapped expression still gets
        // lowered below.
        if let Expression::TSAsExpression(as_expr) = expr {
            let inner = as_expr.expression.clone_in(self.ast.allocator);
            *expr = inner;
            self.visit_expression(expr);
            return;
        }
        if let Expression::TSNonNullExpression(nn_expr) = expr {
            let inner = nn_expr.expression.clone_in(self.ast.allocator);
            *expr = inner;
            self.visit_expression(expr);
            return;
        }
        if let Expression::TSSatisfiesExpression(sat_expr) = expr {
            let inner = sat_expr.expression.clone_in(self.ast.allocator);
            *expr = inner;
            self.visit_expression(expr);
            return;
        }

        match expr {
            Expression::JSXElement(element) => {
                let lowered = self.lower_jsx_element(element);
                *expr = lowered;
            }
            Expression::JSXFragment(fragment) => {
                let lowered = self.lower_jsx_fragment(fragment);
                *expr = lowered;
            }
            _ => walk_expression(self, expr),
        }
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(feature = "napi")]
#[napi]
pub async fn transpile_jsx_native(source: String) -> napi::Result<String> {
    transpile(&source)
        .await
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}
