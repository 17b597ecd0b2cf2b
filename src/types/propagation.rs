//! Type propagation between graph nodes.
//!
//! A typed node's type is a belief that only gets refined: every observed type
//! is added to its set of possible subtypes and the node's type becomes the
//! join of that set. Other nodes subscribe with a [`TypeListener`] and are told
//! about every real change. Notification only fires on a strict change, which
//! is what bounds re-entrant propagation chains.

use super::descriptor::TypeDescriptor;
use super::lattice::TypeLattice;
use crate::graph::Graph;
use crate::node::NodeId;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Receives type changes of the nodes it is registered on.
///
/// Listeners get the graph mutably and may refine other nodes in turn.
pub trait TypeListener {
    fn type_changed(&self, graph: &mut Graph, src: NodeId, old: &TypeDescriptor);

    fn possible_sub_types_changed(&self, graph: &mut Graph, src: NodeId, old: &HashSet<TypeDescriptor>);

    /// The node this listener acts on behalf of, if any.
    ///
    /// A node never notifies listeners it owns.
    fn owner(&self) -> Option<NodeId> {
        None
    }
}

/// Type information held by every typed node.
#[derive(Clone)]
pub struct TypeState {
    pub ty: TypeDescriptor,
    pub possible_sub_types: HashSet<TypeDescriptor>,
    listeners: Vec<Rc<dyn TypeListener>>,
}

impl TypeState {
    pub fn new() -> Self {
        Self {
            ty: TypeDescriptor::unknown(),
            possible_sub_types: HashSet::new(),
            listeners: Vec::new(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for TypeState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeState")
            .field("ty", &self.ty)
            .field("possible_sub_types", &self.possible_sub_types)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn same_listener(a: &Rc<dyn TypeListener>, b: &Rc<dyn TypeListener>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Copies the type of the node it listens to onto `target`.
///
/// Used to let a reference follow the type of the declaration it refers to.
#[derive(Debug, Clone, Copy)]
pub struct TypePropagator {
    target: NodeId,
}

impl TypePropagator {
    pub fn new(target: NodeId) -> Self {
        Self { target }
    }
}

impl TypeListener for TypePropagator {
    fn type_changed(&self, graph: &mut Graph, src: NodeId, _old: &TypeDescriptor) {
        let ty = graph.type_of(src);
        graph.set_type(self.target, ty);
    }

    fn possible_sub_types_changed(&self, graph: &mut Graph, src: NodeId, _old: &HashSet<TypeDescriptor>) {
        let sub_types = graph.possible_sub_types(src);
        graph.set_possible_sub_types(self.target, sub_types);
    }

    fn owner(&self) -> Option<NodeId> {
        Some(self.target)
    }
}

impl Graph {
    fn type_state(&self, id: NodeId) -> Option<&TypeState> {
        self.get(id).and_then(|node| node.types.as_ref())
    }

    fn type_state_mut(&mut self, id: NodeId) -> Option<&mut TypeState> {
        self.get_mut(id).and_then(|node| node.types.as_mut())
    }

    /// Current type of a node; unknown for untyped nodes
    pub fn type_of(&self, id: NodeId) -> TypeDescriptor {
        self.type_state(id)
            .map(|state| state.ty.clone())
            .unwrap_or_else(TypeDescriptor::unknown)
    }

    /// Possible subtypes of a node; empty for untyped nodes
    pub fn possible_sub_types(&self, id: NodeId) -> HashSet<TypeDescriptor> {
        self.type_state(id)
            .map(|state| state.possible_sub_types.clone())
            .unwrap_or_default()
    }

    /// Refine the type of `id` with a newly observed type.
    pub fn set_type(&mut self, id: NodeId, ty: TypeDescriptor) {
        if ty.is_unknown() {
            return;
        }
        let Some(state) = self.type_state_mut(id) else {
            return;
        };

        // a concrete primitive is never replaced by another primitive guess
        if !state.ty.is_unknown() && TypeLattice::is_primitive(&state.ty) && TypeLattice::is_primitive(&ty) {
            return;
        }

        let old_type = state.ty.clone();
        let old_sub_types = state.possible_sub_types.clone();

        let grew = state.possible_sub_types.insert(ty.clone());
        state.ty = TypeLattice::common_type(&state.possible_sub_types).unwrap_or(ty);
        let changed = state.ty != old_type;

        if grew {
            self.notify_sub_types_changed(id, &old_sub_types);
        }
        if changed {
            self.notify_type_changed(id, &old_type);
        }
    }

    /// Merge `sub_types` into the possible subtypes of `id`.
    ///
    /// Primitive-only input is ignored once the node knows anything.
    pub fn set_possible_sub_types(&mut self, id: NodeId, sub_types: impl IntoIterator<Item = TypeDescriptor>) {
        let incoming: Vec<TypeDescriptor> = sub_types.into_iter().collect();
        let Some(state) = self.type_state_mut(id) else {
            return;
        };

        if TypeLattice::all_primitive(&incoming) && !state.possible_sub_types.is_empty() {
            return;
        }

        let old_sub_types = state.possible_sub_types.clone();
        state.possible_sub_types.extend(incoming);

        if state.possible_sub_types.len() > old_sub_types.len() {
            self.notify_sub_types_changed(id, &old_sub_types);
        }
    }

    /// Pin the type of `id`, discarding everything observed so far.
    pub fn reset_types(&mut self, id: NodeId, ty: TypeDescriptor) {
        let Some(state) = self.type_state_mut(id) else {
            return;
        };

        let old_type = std::mem::replace(&mut state.ty, ty.clone());
        let old_sub_types = std::mem::take(&mut state.possible_sub_types);

        if old_type != ty {
            self.notify_type_changed(id, &old_type);
        }
        if old_sub_types.len() != 1 || !old_sub_types.contains(&ty) {
            self.notify_sub_types_changed(id, &old_sub_types);
        }
    }

    /// Subscribe `listener` to `id` and replay the current state to it.
    pub fn register_type_listener(&mut self, id: NodeId, listener: Rc<dyn TypeListener>) {
        let Some(state) = self.type_state_mut(id) else {
            return;
        };
        if !state.listeners.iter().any(|l| same_listener(l, &listener)) {
            state.listeners.push(listener.clone());
        }

        if self.should_be_notified(id, &*listener) {
            let ty = self.type_of(id);
            let sub_types = self.possible_sub_types(id);
            listener.type_changed(self, id, &ty);
            listener.possible_sub_types_changed(self, id, &sub_types);
        }
    }

    pub fn unregister_type_listener(&mut self, id: NodeId, listener: &Rc<dyn TypeListener>) {
        if let Some(state) = self.type_state_mut(id) {
            state.listeners.retain(|l| !same_listener(l, listener));
        }
    }

    /// Drop every listener on `id` that acts for `owner`.
    pub fn unregister_type_listeners_owned_by(&mut self, id: NodeId, owner: NodeId) {
        if let Some(state) = self.type_state_mut(id) {
            state.listeners.retain(|l| l.owner() != Some(owner));
        }
    }

    /// Re-broadcast the current state of `id` to its listeners.
    pub fn refresh_type(&mut self, id: NodeId) {
        let ty = self.type_of(id);
        let sub_types = self.possible_sub_types(id);
        for listener in self.eligible_listeners(id) {
            listener.type_changed(self, id, &ty);
            listener.possible_sub_types_changed(self, id, &sub_types);
        }
    }

    pub fn type_listener_count(&self, id: NodeId) -> usize {
        self.type_state(id).map_or(0, TypeState::listener_count)
    }

    fn should_be_notified(&self, id: NodeId, listener: &dyn TypeListener) -> bool {
        listener.owner() != Some(id)
    }

    fn eligible_listeners(&self, id: NodeId) -> Vec<Rc<dyn TypeListener>> {
        self.type_state(id)
            .map(|state| {
                state
                    .listeners
                    .iter()
                    .filter(|l| self.should_be_notified(id, &***l))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn notify_type_changed(&mut self, id: NodeId, old: &TypeDescriptor) {
        for listener in self.eligible_listeners(id) {
            listener.type_changed(self, id, old);
        }
    }

    fn notify_sub_types_changed(&mut self, id: NodeId, old: &HashSet<TypeDescriptor>) {
        for listener in self.eligible_listeners(id) {
            listener.possible_sub_types_changed(self, id, old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    enum Event {
        Type(TypeDescriptor),
        SubTypes(usize),
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<Event>>,
    }

    impl TypeListener for Recorder {
        fn type_changed(&self, graph: &mut Graph, src: NodeId, _old: &TypeDescriptor) {
            self.events.borrow_mut().push(Event::Type(graph.type_of(src)));
        }

        fn possible_sub_types_changed(&self, graph: &mut Graph, src: NodeId, _old: &HashSet<TypeDescriptor>) {
            let count = graph.possible_sub_types(src).len();
            self.events.borrow_mut().push(Event::SubTypes(count));
        }
    }

    fn t(raw: &str) -> TypeDescriptor {
        TypeDescriptor::parse(raw)
    }

    fn variable(graph: &mut Graph, name: &str) -> NodeId {
        graph.add_node(Node::new(name, NodeKind::Variable { initializer: None }))
    }

    #[test]
    fn test_set_type_on_fresh_node() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        graph.set_type(v, t("Foo"));
        assert_eq!(graph.type_of(v), t("Foo"));
        assert_eq!(graph.possible_sub_types(v), HashSet::from([t("Foo")]));
    }

    #[test]
    fn test_unknown_is_ignored() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        graph.set_type(v, TypeDescriptor::unknown());
        assert!(graph.type_of(v).is_unknown());
        assert!(graph.possible_sub_types(v).is_empty());
    }

    #[test]
    fn test_primitive_pinning() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        graph.set_type(v, t("int"));
        graph.set_type(v, t("long"));
        assert_eq!(graph.type_of(v), t("int"));
        assert_eq!(graph.possible_sub_types(v).len(), 1);
    }

    #[test]
    fn test_join_of_unrelated_types() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        graph.set_type(v, t("Foo"));
        graph.set_type(v, t("Bar"));
        assert!(graph.type_of(v).is_unknown());
        assert_eq!(graph.possible_sub_types(v).len(), 2);
    }

    #[test]
    fn test_sub_types_only_grow() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        let mut previous = graph.possible_sub_types(v);
        let steps: Vec<Box<dyn Fn(&mut Graph)>> = vec![
            Box::new(move |g| g.set_type(v, t("Foo"))),
            Box::new(move |g| g.set_possible_sub_types(v, [t("int")])),
            Box::new(move |g| g.set_possible_sub_types(v, [t("Bar"), t("int")])),
            Box::new(move |g| g.set_type(v, t("char"))),
            Box::new(move |g| g.set_possible_sub_types(v, [])),
        ];
        for step in steps {
            step(&mut graph);
            let current = graph.possible_sub_types(v);
            assert!(previous.is_subset(&current));
            previous = current;
        }

        graph.reset_types(v, t("Baz"));
        assert!(graph.possible_sub_types(v).is_empty());
        assert_eq!(graph.type_of(v), t("Baz"));
    }

    #[test]
    fn test_primitive_sub_types_do_not_replace_known_ones() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");

        graph.set_type(v, t("Foo"));
        graph.set_possible_sub_types(v, [t("int"), t("char")]);
        assert_eq!(graph.possible_sub_types(v), HashSet::from([t("Foo")]));
    }

    #[test]
    fn test_listener_replay() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");
        graph.set_type(v, t("Foo"));

        let recorder = Rc::new(Recorder::default());
        graph.register_type_listener(v, recorder.clone());

        assert_eq!(
            *recorder.events.borrow(),
            vec![Event::Type(t("Foo")), Event::SubTypes(1)]
        );
    }

    #[test]
    fn test_notifies_only_on_change() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");
        let recorder = Rc::new(Recorder::default());
        graph.register_type_listener(v, recorder.clone());
        recorder.events.borrow_mut().clear();

        graph.set_type(v, t("Foo"));
        assert_eq!(recorder.events.borrow().len(), 2);

        graph.set_type(v, t("Foo"));
        graph.set_possible_sub_types(v, [t("Foo")]);
        assert_eq!(recorder.events.borrow().len(), 2);

        let listener: Rc<dyn TypeListener> = recorder.clone();
        graph.unregister_type_listener(v, &listener);
        graph.unregister_type_listener(v, &listener);
        graph.set_type(v, t("Bar"));
        assert_eq!(recorder.events.borrow().len(), 2);
    }

    #[test]
    fn test_reset_types_notifications() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");
        graph.set_type(v, t("Foo"));
        let recorder = Rc::new(Recorder::default());
        graph.register_type_listener(v, recorder.clone());
        recorder.events.borrow_mut().clear();

        // old set was exactly {Foo}: no subtype notification, no type change
        graph.reset_types(v, t("Foo"));
        assert!(recorder.events.borrow().is_empty());

        graph.reset_types(v, t("Bar"));
        assert_eq!(
            *recorder.events.borrow(),
            vec![Event::Type(t("Bar")), Event::SubTypes(0)]
        );
    }

    #[test]
    fn test_refresh_rebroadcasts() {
        let mut graph = Graph::new();
        let v = variable(&mut graph, "v");
        graph.set_type(v, t("Foo"));
        let recorder = Rc::new(Recorder::default());
        graph.register_type_listener(v, recorder.clone());
        recorder.events.borrow_mut().clear();

        graph.refresh_type(v);
        assert_eq!(recorder.events.borrow().len(), 2);
        assert_eq!(graph.type_of(v), t("Foo"));
    }

    #[test]
    fn test_propagator_chain_terminates_on_cycle() {
        let mut graph = Graph::new();
        let a = variable(&mut graph, "a");
        let b = variable(&mut graph, "b");

        graph.register_type_listener(a, Rc::new(TypePropagator::new(b)));
        graph.register_type_listener(b, Rc::new(TypePropagator::new(a)));

        graph.set_type(a, t("Foo"));
        assert_eq!(graph.type_of(b), t("Foo"));

        graph.set_type(b, t("Foo*"));
        assert!(graph.possible_sub_types(a).contains(&t("Foo*")));
        assert_eq!(graph.possible_sub_types(a), graph.possible_sub_types(b));
    }

    #[test]
    fn test_self_owned_listener_is_not_notified() {
        let mut graph = Graph::new();
        let a = variable(&mut graph, "a");
        graph.set_type(a, t("Foo"));

        graph.register_type_listener(a, Rc::new(TypePropagator::new(a)));
        assert_eq!(graph.type_listener_count(a), 1);
        graph.set_type(a, t("Bar"));
        assert_eq!(graph.possible_sub_types(a).len(), 2);

        graph.unregister_type_listeners_owned_by(a, a);
        assert_eq!(graph.type_listener_count(a), 0);
    }

    #[test]
    fn test_untyped_nodes_ignore_protocol() {
        let mut graph = Graph::new();
        let block = graph.add_node(Node::new("", NodeKind::Block { statements: vec![] }));

        graph.set_type(block, t("Foo"));
        graph.register_type_listener(block, Rc::new(Recorder::default()));
        assert!(graph.type_of(block).is_unknown());
        assert_eq!(graph.type_listener_count(block), 0);
    }
}
