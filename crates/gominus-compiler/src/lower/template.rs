//! Template Instantiation
//!
//! Each distinct list of type arguments produces one instance, named after
//! the template and the arguments (`Max_int`, `Box_string`). Instances are
//! cached per template. Class layouts and function signatures are created
//! on first use; bodies are queued and lowered after the program's own
//! functions.

use super::{FunctionSource, IrGenerator, Operand};
use crate::error::IrGenError;
use gominus_checker::Type;
use gominus_parser::ast::{ClassStatement, Identifier, Statement, TemplateStatement, TypeExpr};
use rustc_hash::FxHashMap;

/// A declared template and its instances so far
#[derive(Debug)]
pub(super) struct TemplateDef<'a> {
    pub params: Vec<String>,
    pub body: &'a Statement,
    /// Instantiation key to instance symbol
    pub instances: FxHashMap<String, String>,
}

impl<'a> TemplateDef<'a> {
    pub fn new(template: &'a TemplateStatement) -> Self {
        Self {
            params: template.type_params.iter().map(|p| p.name.clone()).collect(),
            body: &template.body,
            instances: FxHashMap::default(),
        }
    }

    fn is_class(&self) -> bool {
        matches!(self.body, Statement::Class(_))
    }
}

/// An instance whose body still has to be lowered
#[derive(Debug)]
pub(super) struct PendingInstance<'a> {
    symbol: String,
    bindings: Vec<(String, Type)>,
    body: &'a Statement,
}

/// `Name_T1_T2`, from the display form of each argument.
pub(super) fn template_key(name: &str, args: &[Type]) -> String {
    let mut key = name.to_string();
    for arg in args {
        key.push('_');
        key.push_str(&arg.to_string());
    }
    key
}

/// Replace everything that cannot appear in a symbol with `_`.
pub(super) fn mangle(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

impl<'a> IrGenerator<'a> {
    /// Symbol of the instance of `name` for `args`, creating it on first
    /// use.
    pub(super) fn instantiate(&mut self, name: &Identifier, args: Vec<Type>) -> Option<String> {
        let Some(def) = self.templates.get(&name.name) else {
            self.error(IrGenError::NotATemplate {
                name: name.name.clone(),
                span: name.span,
            });
            return None;
        };
        if def.params.len() != args.len() {
            let expected = def.params.len();
            self.error(IrGenError::TypeArgumentCount {
                name: name.name.clone(),
                expected,
                actual: args.len(),
                span: name.span,
            });
            return None;
        }

        let key = template_key(&name.name, &args);
        if let Some(symbol) = def.instances.get(&key) {
            tracing::trace!(instance = %symbol, "template cache hit");
            return Some(symbol.clone());
        }

        let symbol = mangle(&key);
        let body = def.body;
        let bindings: Vec<(String, Type)> = def.params.iter().cloned().zip(args).collect();
        if let Some(def) = self.templates.get_mut(&name.name) {
            def.instances.insert(key, symbol.clone());
        }
        tracing::debug!(template = %name.name, instance = %symbol, "instantiating template");

        // Register the instance before anything can refer back to it
        match body {
            Statement::Function(func) => {
                let info = self.with_nested(bindings.clone(), |gen| {
                    gen.function_info(&func.params, func.return_type.as_ref())
                });
                self.functions.insert(symbol.clone(), info);
            }
            Statement::Class(class) => {
                self.with_nested(bindings.clone(), |gen| gen.layout_instance(&symbol, class));
            }
            _ => {}
        }
        self.pending_instances.push(PendingInstance {
            symbol: symbol.clone(),
            bindings,
            body,
        });
        Some(symbol)
    }

    fn layout_instance(&mut self, symbol: &str, class: &'a ClassStatement) {
        let parent = class
            .extends
            .as_ref()
            .map(|p| p.name.clone())
            .filter(|parent| self.layout_class(parent, &mut Vec::new()));
        let layout = self.build_layout(symbol, class, parent);
        self.emit_layout(layout);
    }

    /// Lower the bodies of queued instances, including instances created
    /// while doing so.
    pub(super) fn lower_pending_instances(&mut self) {
        loop {
            let batch = std::mem::take(&mut self.pending_instances);
            if batch.is_empty() {
                break;
            }
            for instance in batch {
                let PendingInstance { symbol, bindings, body } = instance;
                self.with_nested(bindings, |gen| match body {
                    Statement::Function(func) => {
                        let Some(info) = gen.functions.get(&symbol).cloned() else {
                            gen.internal("template instance without a signature");
                            return;
                        };
                        gen.lower_function(FunctionSource {
                            symbol: symbol.clone(),
                            params: &func.params,
                            info,
                            body: &func.body,
                            span: func.span,
                            this_class: None,
                            receiver: None,
                        });
                    }
                    Statement::Class(class) => gen.lower_class_body(&symbol, class),
                    _ => {}
                });
            }
        }
    }

    pub(super) fn is_class_template(&self, name: &str) -> bool {
        self.templates.get(name).map(TemplateDef::is_class).unwrap_or(false)
    }

    /// Type arguments of a function template call written without them,
    /// taken from the arguments passed where a parameter is declared as a
    /// bare type parameter.
    pub(super) fn infer_template_args(&self, name: &str, args: &[Operand]) -> Vec<Type> {
        let Some(def) = self.templates.get(name) else {
            return Vec::new();
        };
        let Statement::Function(func) = def.body else {
            return Vec::new();
        };
        def.params
            .iter()
            .filter_map(|param| {
                func.params
                    .iter()
                    .position(|p| matches!(p.ty.as_ref().map(TypeExpr::base), Some(TypeExpr::Named(id)) if id.name == *param))
                    .and_then(|i| args.get(i))
                    .map(|arg| arg.ty.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::IrGenerator;
    use gominus_parser::parse;

    fn lower(source: &str) -> Result<String, Vec<String>> {
        lower_with(source, true)
    }

    /// Lower input the checker rejects, to reach the generator's own errors.
    fn lower_unchecked(source: &str) -> Result<String, Vec<String>> {
        lower_with(source, false)
    }

    fn lower_with(source: &str, checked: bool) -> Result<String, Vec<String>> {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let analysis = gominus_checker::analyze_with(&program, true);
        if checked {
            assert!(analysis.errors().is_empty(), "check errors: {:?}", analysis.errors());
        }
        let mut generator = IrGenerator::new(&analysis.scopes);
        generator
            .generate_program(&program)
            .map_err(|errors| errors.iter().map(|e| e.to_string()).collect())
    }

    const MAX: &str = "template<T> func Max(a T, b T) T {\n if a > b { return a }\n return b\n}\n";

    #[test]
    fn test_key_and_mangle() {
        let key = template_key("Box", &[Type::Array(Box::new(Type::int())), Type::string()]);
        assert_eq!(key, "Box_[]int_string");
        assert_eq!(mangle(&key), "Box___int_string");
    }

    #[test]
    fn test_function_instance_is_cached() {
        let source = format!(
            "{}func main() {{\n x := Max<int>(1, 2)\n y := Max<int>(3, 4)\n z := Max(5, 6)\n}}",
            MAX
        );
        let ir = lower(&source).unwrap();
        assert_eq!(ir.matches("define i32 @Max_int(").count(), 1, "got: {}", ir);
        assert!(ir.contains("call i32 @Max_int(i32 1, i32 2)"), "got: {}", ir);
        assert!(ir.contains("call i32 @Max_int(i32 5, i32 6)"), "got: {}", ir);
    }

    #[test]
    fn test_distinct_instances() {
        let source = format!("{}func main() {{\n a := Max<int>(1, 2)\n b := Max<float>(1.5, 2.5)\n}}", MAX);
        let ir = lower(&source).unwrap();
        assert!(ir.contains("define i32 @Max_int(i32 %r0, i32 %r1)"), "got: {}", ir);
        assert!(ir.contains("define double @Max_float(double %r0, double %r1)"), "got: {}", ir);
        assert!(ir.contains("fcmp ogt double"), "got: {}", ir);
    }

    #[test]
    fn test_class_instance() {
        let ir = lower(
            "template<T> class Box {\n var value T\n func get() T { return value }\n}\nfunc main() {\n b := new Box<int>()\n b.get()\n}",
        )
        .unwrap();
        assert!(ir.contains("%Box_int = type { ptr, i32 }"), "got: {}", ir);
        assert!(ir.contains("define i32 @Box_int_get(ptr %r0)"), "got: {}", ir);
        assert!(ir.contains("call i32 @Box_int_get(ptr"), "got: {}", ir);
    }

    #[test]
    fn test_wrong_type_argument_count() {
        let source = format!("{}func main() {{ x := Max<int, int>(1, 2) }}", MAX);
        let errors = lower_unchecked(&source).unwrap_err();
        assert!(
            errors.contains(&"wrong number of type arguments to Max: expected 1, got 2".to_string()),
            "got: {:?}",
            errors
        );
    }
}
