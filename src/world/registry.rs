use crate::world::BodyId;

/// Bodies that can currently be cut, in insertion order.
///
/// Owned by the [`World`](crate::world::World) of a session. The cut
/// orchestrator removes consumed bodies and the body merger adds new ones;
/// everything else only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveRegistry {
    bodies: Vec<BodyId>,
}

impl ActiveRegistry {
    pub const fn new() -> Self {
        ActiveRegistry { bodies: Vec::new() }
    }

    /// Register `body`; returns `false` if it was already active
    pub fn insert(&mut self, body: BodyId) -> bool {
        if self.contains(body) {
            return false;
        }
        self.bodies.push(body);
        true
    }

    /// Unregister `body`; returns `false` if it was not active
    pub fn remove(&mut self, body: BodyId) -> bool {
        match self.bodies.iter().position(|&b| b == body) {
            Some(index) => {
                self.bodies.remove(index);
                true
            },
            None => false,
        }
    }

    pub fn contains(&self, body: BodyId) -> bool {
        self.bodies.contains(&body)
    }

    pub fn iter(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.iter().copied()
    }

    /// Owned copy of the current list, safe to iterate while cutting
    pub fn snapshot(&self) -> Vec<BodyId> {
        self.bodies.clone()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}
