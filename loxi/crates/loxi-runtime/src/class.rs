//! Classes, instances, and C3 method resolution order.
//!
//! A class carries its ordered direct superclasses, an insertion-ordered
//! method table, a separate class-method table, and its precomputed MRO.
//! Method lookup walks the MRO front to back; the first class defining the
//! name wins. Class identity is `Rc` pointer identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use loxi_util::symbol::SYM_INIT;
use loxi_util::{Span, Symbol};
use rustc_hash::FxHashMap;

use crate::error::{EvalResult, RuntimeError};
use crate::function::LoxFunction;
use crate::value::Value;
use crate::Interpreter;

/// A Lox class.
pub struct LoxClass {
    pub name: Symbol,
    /// Direct superclasses, in declaration order.
    pub superclasses: Vec<Rc<LoxClass>>,
    /// Instance methods. Insertion-ordered; a later definition of a name
    /// within one class body replaces the earlier one.
    pub methods: IndexMap<Symbol, Rc<LoxFunction>>,
    /// Class (static) methods, dispatched on the class value itself.
    pub class_methods: IndexMap<Symbol, Rc<LoxFunction>>,
    /// Method resolution order, starting with this class. Filled in by
    /// [`LoxClass::link_mro`] immediately after construction; the cell is
    /// needed because the linearization includes the class itself.
    mro: RefCell<Vec<Rc<LoxClass>>>,
}

impl LoxClass {
    pub fn new(
        name: Symbol,
        superclasses: Vec<Rc<LoxClass>>,
        methods: IndexMap<Symbol, Rc<LoxFunction>>,
        class_methods: IndexMap<Symbol, Rc<LoxFunction>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name,
            superclasses,
            methods,
            class_methods,
            mro: RefCell::new(Vec::new()),
        })
    }

    /// Compute and store the C3 linearization of `class`.
    ///
    /// ```text
    /// mro(C) = [C]                                        if C has no superclasses
    /// mro(C) = [C] + merge(mro(P₁), …, mro(Pₙ), [P₁…Pₙ])  otherwise
    /// ```
    ///
    /// Fails with "Cannot create a consistent MRO." when no valid
    /// linearization exists.
    pub fn link_mro(class: &Rc<LoxClass>, span: Span) -> Result<(), RuntimeError> {
        let mro = if class.superclasses.is_empty() {
            vec![class.clone()]
        } else {
            let mut inputs: Vec<Vec<Rc<LoxClass>>> = class
                .superclasses
                .iter()
                .map(|superclass| superclass.mro_classes())
                .collect();
            inputs.push(class.superclasses.clone());

            match c3_merge(inputs) {
                Some(merged) => {
                    let mut mro = Vec::with_capacity(merged.len() + 1);
                    mro.push(class.clone());
                    mro.extend(merged);
                    mro
                }
                None => {
                    return Err(RuntimeError::new(span, "Cannot create a consistent MRO."))
                }
            }
        };

        *class.mro.borrow_mut() = mro;
        Ok(())
    }

    /// The MRO as a list of classes, starting with this one.
    pub fn mro_classes(&self) -> Vec<Rc<LoxClass>> {
        self.mro.borrow().clone()
    }

    /// Find an instance method by walking the MRO in order.
    pub fn find_method(&self, name: Symbol) -> Option<Rc<LoxFunction>> {
        self.mro
            .borrow()
            .iter()
            .find_map(|class| class.methods.get(&name).cloned())
    }

    /// Find a class method by walking the MRO in order.
    pub fn find_class_method(&self, name: Symbol) -> Option<Rc<LoxFunction>> {
        self.mro
            .borrow()
            .iter()
            .find_map(|class| class.class_methods.get(&name).cloned())
    }

    /// Calling a class takes as many arguments as its initializer, or none.
    pub fn arity(&self) -> usize {
        self.find_method(SYM_INIT)
            .map(|init| init.arity())
            .unwrap_or(0)
    }

    /// Instantiate the class: create the instance, then run `init` bound to
    /// it, if any class along the MRO defines one.
    pub fn instantiate(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter,
        args: &[Value],
    ) -> EvalResult<Value> {
        let instance = LoxInstance::new(class.clone());
        if let Some(init) = class.find_method(SYM_INIT) {
            init.bind(Value::Instance(instance.clone()))
                .call(interpreter, args)?;
        }
        Ok(Value::Instance(instance))
    }
}

// The MRO starts with the class itself; the derived Debug would recurse.
impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoxClass({})", self.name)
    }
}

/// C3 merge: repeatedly take a *good head* - the first element of some
/// input list appearing in no other list's tail - append it to the result,
/// and strip it from the front of every list. No good head means the
/// hierarchy admits no consistent order.
fn c3_merge(mut inputs: Vec<Vec<Rc<LoxClass>>>) -> Option<Vec<Rc<LoxClass>>> {
    let mut result = Vec::new();
    inputs.retain(|list| !list.is_empty());

    while !inputs.is_empty() {
        let good_head = inputs
            .iter()
            .map(|list| &list[0])
            .find(|&head| {
                !inputs
                    .iter()
                    .any(|list| list[1..].iter().any(|class| Rc::ptr_eq(class, head)))
            })
            .cloned()?;

        for list in &mut inputs {
            if Rc::ptr_eq(&list[0], &good_head) {
                list.remove(0);
            }
        }
        inputs.retain(|list| !list.is_empty());
        result.push(good_head);
    }

    Some(result)
}

/// A class instance: its class and a mutable field map.
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: RefCell<FxHashMap<Symbol, Value>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Rc<Self> {
        Rc::new(Self {
            class,
            fields: RefCell::new(FxHashMap::default()),
        })
    }

    /// Read a field. Fields shadow methods; the caller falls back to the
    /// MRO method lookup when this returns `None`.
    pub fn get_field(&self, name: Symbol) -> Option<Value> {
        self.fields.borrow().get(&name).cloned()
    }

    /// Write a field, creating it if absent.
    pub fn set_field(&self, name: Symbol, value: Value) {
        self.fields.borrow_mut().insert(name, value);
    }
}

// Fields may hold closures that capture the instance; keep Debug shallow.
impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoxInstance({} instance)", self.class.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, superclasses: Vec<Rc<LoxClass>>) -> Rc<LoxClass> {
        let class = LoxClass::new(
            Symbol::intern(name),
            superclasses,
            IndexMap::new(),
            IndexMap::new(),
        );
        LoxClass::link_mro(&class, Span::DUMMY).expect("consistent hierarchy");
        class
    }

    fn mro_names(class: &Rc<LoxClass>) -> Vec<&'static str> {
        class
            .mro_classes()
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn test_mro_of_root_class_is_itself() {
        let a = class("A", vec![]);
        assert_eq!(mro_names(&a), vec!["A"]);
    }

    #[test]
    fn test_mro_starts_with_class_and_contains_direct_supers() {
        let a = class("A", vec![]);
        let b = class("B", vec![a.clone()]);
        let mro = b.mro_classes();
        assert!(Rc::ptr_eq(&mro[0], &b));
        assert!(mro.iter().any(|c| Rc::ptr_eq(c, &a)));
    }

    #[test]
    fn test_mro_single_chain() {
        let a = class("A", vec![]);
        let b = class("B", vec![a]);
        let c = class("C", vec![b]);
        assert_eq!(mro_names(&c), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_mro_diamond() {
        let a = class("A", vec![]);
        let b = class("B", vec![a.clone()]);
        let c = class("C", vec![a]);
        let d = class("D", vec![b, c]);
        assert_eq!(mro_names(&d), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_mro_respects_declaration_order() {
        let a = class("A", vec![]);
        let b = class("B", vec![]);
        let c = class("C", vec![b.clone(), a.clone()]);
        assert_eq!(mro_names(&c), vec!["C", "B", "A"]);
        let d = class("D", vec![a, b]);
        assert_eq!(mro_names(&d), vec!["D", "A", "B"]);
    }

    #[test]
    fn test_inconsistent_hierarchy_fails() {
        let x = class("X", vec![]);
        let y = class("Y", vec![]);
        let a = class("A", vec![x.clone(), y.clone()]);
        let b = class("B", vec![y, x]);

        let c = LoxClass::new(
            Symbol::intern("C"),
            vec![a, b],
            IndexMap::new(),
            IndexMap::new(),
        );
        let error = LoxClass::link_mro(&c, Span::DUMMY).unwrap_err();
        assert_eq!(error.message, "Cannot create a consistent MRO.");
    }

    #[test]
    fn test_instance_fields() {
        let a = class("A", vec![]);
        let instance = LoxInstance::new(a);
        assert!(instance.get_field(Symbol::intern("x")).is_none());
        instance.set_field(Symbol::intern("x"), Value::Number(1.0));
        assert!(instance
            .get_field(Symbol::intern("x"))
            .unwrap()
            .equals(&Value::Number(1.0)));
    }

    #[test]
    fn test_arity_without_initializer_is_zero() {
        let a = class("A", vec![]);
        assert_eq!(a.arity(), 0);
    }
}
