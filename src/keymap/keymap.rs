//! Keymap tree and the registry of named keymaps
//!
//! A keymap maps chords to entries; an entry is either a nested prefix node
//! or a [`Binding`]. Keymaps may name a parent: lookup falls back through the
//! parent chain at every step of a sequence, so a child keymap inherits the
//! continuations of its parent's prefixes too.

use std::collections::{HashMap, HashSet};

use super::binding::Binding;
use super::config::KeymapError;
use super::types::{format_key_sequence, parse_key_sequence, KeyPress};

/// Result of looking up a key sequence
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// Nothing is bound to this sequence
    NoMatch,
    /// The sequence is a prefix, more keys are required
    Partial,
    /// The sequence resolves to a binding
    Complete(Binding),
}

impl LookupResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, LookupResult::NoMatch)
    }
}

/// Stable handle to a keymap registered in [`Keymaps`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeymapId(usize);

/// An entry in a keymap node
#[derive(Debug, Clone)]
pub enum Entry {
    Prefix(KeymapNode),
    Binding(Binding),
}

/// One level of the prefix tree
#[derive(Debug, Clone, Default)]
pub struct KeymapNode {
    bindings: HashMap<KeyPress, Entry>,
}

impl KeymapNode {
    pub fn get(&self, key: &KeyPress) -> Option<&Entry> {
        self.bindings.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Entries sorted by chord string, for deterministic walks
    fn sorted(&self) -> Vec<(&KeyPress, &Entry)> {
        let mut entries: Vec<_> = self.bindings.iter().collect();
        entries.sort_by_cached_key(|(k, _)| k.to_string());
        entries
    }
}

/// A named keymap with an optional parent
#[derive(Debug, Clone)]
pub struct Keymap {
    name: String,
    doc: String,
    parent: Option<KeymapId>,
    root: KeymapNode,
}

impl Keymap {
    /// Create an empty keymap
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            parent: None,
            root: KeymapNode::default(),
        }
    }

    pub fn with_parent(mut self, parent: KeymapId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn parent(&self) -> Option<KeymapId> {
        self.parent
    }

    pub fn set_doc(&mut self, doc: impl Into<String>) {
        self.doc = doc.into();
    }

    pub fn set_parent(&mut self, parent: Option<KeymapId>) {
        self.parent = parent;
    }

    /// Top level of the tree
    pub fn root(&self) -> &KeymapNode {
        &self.root
    }

    /// Bind a space-separated sequence such as `"C-x C-c"`
    pub fn define_key(
        &mut self,
        sequence: &str,
        binding: impl Into<Binding>,
    ) -> Result<(), KeymapError> {
        let keys = parse_key_sequence(sequence)?;
        self.define_keys(&keys, binding.into())
    }

    /// Bind an already parsed sequence
    ///
    /// Intermediate leaves are replaced by prefix nodes; binding a leaf over
    /// an existing prefix drops the whole subtree.
    pub fn define_keys(&mut self, keys: &[KeyPress], binding: Binding) -> Result<(), KeymapError> {
        if let Binding::Command(name) = &binding {
            if name.trim().is_empty() {
                return Err(KeymapError::InvalidBinding(format_key_sequence(keys)));
            }
        }
        let Some((last, prefix)) = keys.split_last() else {
            return Err(KeymapError::InvalidBinding(String::new()));
        };

        let mut node = &mut self.root;
        for key in prefix {
            let entry = node
                .bindings
                .entry(*key)
                .or_insert_with(|| Entry::Prefix(KeymapNode::default()));
            if matches!(entry, Entry::Binding(_)) {
                *entry = Entry::Prefix(KeymapNode::default());
            }
            node = match entry {
                Entry::Prefix(sub) => sub,
                Entry::Binding(_) => {
                    return Err(KeymapError::InvalidBinding(format_key_sequence(keys)))
                }
            };
        }
        node.bindings.insert(*last, Entry::Binding(binding));
        Ok(())
    }

    /// Remove the binding under `sequence`. Returns whether one was removed.
    ///
    /// Only this keymap's own tree is touched; inherited bindings stay.
    pub fn undefine_key(&mut self, sequence: &str) -> Result<bool, KeymapError> {
        let keys = parse_key_sequence(sequence)?;
        Ok(self.undefine_keys(&keys))
    }

    pub fn undefine_keys(&mut self, keys: &[KeyPress]) -> bool {
        let Some((last, prefix)) = keys.split_last() else {
            return false;
        };
        let mut node = &mut self.root;
        for key in prefix {
            node = match node.bindings.get_mut(key) {
                Some(Entry::Prefix(sub)) => sub,
                _ => return false,
            };
        }
        match node.bindings.get(last) {
            Some(Entry::Binding(_)) => node.bindings.remove(last).is_some(),
            _ => false,
        }
    }

    /// Number of leaf bindings in this keymap's own tree
    pub fn binding_count(&self) -> usize {
        fn count(node: &KeymapNode) -> usize {
            node.bindings
                .values()
                .map(|e| match e {
                    Entry::Prefix(sub) => count(sub),
                    Entry::Binding(_) => 1,
                })
                .sum()
        }
        count(&self.root)
    }
}

/// Registry owning every named keymap
#[derive(Debug, Clone, Default)]
pub struct Keymaps {
    maps: Vec<Keymap>,
    by_name: HashMap<String, KeymapId>,
}

impl Keymaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keymap; names are unique
    pub fn register(&mut self, keymap: Keymap) -> Result<KeymapId, KeymapError> {
        if self.by_name.contains_key(keymap.name()) {
            return Err(KeymapError::DuplicateKeymap(keymap.name().to_string()));
        }
        let id = KeymapId(self.maps.len());
        self.by_name.insert(keymap.name().to_string(), id);
        self.maps.push(keymap);
        Ok(id)
    }

    pub fn get(&self, id: KeymapId) -> &Keymap {
        &self.maps[id.0]
    }

    pub fn get_mut(&mut self, id: KeymapId) -> &mut Keymap {
        &mut self.maps[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<KeymapId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a name, failing with [`KeymapError::UnknownKeymap`]
    pub fn require(&self, name: &str) -> Result<KeymapId, KeymapError> {
        self.by_name(name)
            .ok_or_else(|| KeymapError::UnknownKeymap(name.to_string()))
    }

    pub fn name(&self, id: KeymapId) -> &str {
        self.get(id).name()
    }

    /// Registered keymap names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.maps.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names
    }

    /// Bind in the keymap named `keymap`
    pub fn define_key(
        &mut self,
        keymap: &str,
        sequence: &str,
        binding: impl Into<Binding>,
    ) -> Result<(), KeymapError> {
        let id = self.require(keymap)?;
        self.get_mut(id).define_key(sequence, binding)
    }

    /// Root nodes of `id` followed by its ancestors
    fn root_chain(&self, id: KeymapId) -> Vec<&KeymapNode> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if !seen.insert(cur) {
                tracing::warn!("Keymap parent cycle through '{}'", self.name(cur));
                break;
            }
            let keymap = self.get(cur);
            chain.push(&keymap.root);
            current = keymap.parent;
        }
        chain
    }

    /// Look up a key sequence in `id`, falling back to its parents
    ///
    /// At each step the first node of the chain that knows the chord decides:
    /// a leaf completes the lookup, a prefix narrows the chain to the prefix
    /// nodes found under that chord in the remaining ancestors.
    pub fn lookup(&self, id: KeymapId, keys: &[KeyPress]) -> LookupResult {
        let mut chain = self.root_chain(id);
        let mut partial = false;

        for key in keys {
            let mut next: Vec<&KeymapNode> = Vec::new();
            for node in &chain {
                match node.bindings.get(key) {
                    Some(Entry::Binding(binding)) if next.is_empty() => {
                        return LookupResult::Complete(binding.clone());
                    }
                    Some(Entry::Prefix(sub)) => next.push(sub),
                    _ => {}
                }
            }
            if next.is_empty() {
                return LookupResult::NoMatch;
            }
            chain = next;
            partial = true;
        }

        if partial {
            LookupResult::Partial
        } else {
            LookupResult::NoMatch
        }
    }

    /// Walk every reachable binding of `id`, including inherited ones not
    /// shadowed by a closer keymap
    pub fn traverse(&self, id: KeymapId, mut f: impl FnMut(&[KeyPress], &Binding)) {
        fn walk(
            node: &KeymapNode,
            prefix: &mut Vec<KeyPress>,
            f: &mut dyn FnMut(&[KeyPress], &Binding),
        ) {
            for (key, entry) in node.sorted() {
                prefix.push(*key);
                match entry {
                    Entry::Prefix(sub) => walk(sub, prefix, f),
                    Entry::Binding(binding) => f(prefix, binding),
                }
                prefix.pop();
            }
        }

        let mut shadowed: HashSet<KeyPress> = HashSet::new();
        let mut prefix = Vec::new();
        for node in self.root_chain(id) {
            for (key, entry) in node.sorted() {
                if !shadowed.insert(*key) {
                    continue;
                }
                prefix.push(*key);
                match entry {
                    Entry::Prefix(sub) => walk(sub, &mut prefix, &mut f),
                    Entry::Binding(binding) => f(&prefix, binding),
                }
                prefix.pop();
            }
        }
    }

    /// All sequences bound to `command` in `id` (inherited ones included)
    pub fn where_is(&self, id: KeymapId, command: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.traverse(id, |keys, binding| {
            if binding.command_name() == Some(command) {
                found.push(format_key_sequence(keys));
            }
        });
        found
    }
}
