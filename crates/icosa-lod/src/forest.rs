//! Generational arena that owns every face of the planet.
//!
//! Children are stored as ids in their parent, the parent as a back-link in
//! each child. Freed slots are recycled with a bumped generation, so stale
//! ids never alias a newer face.

use crate::face::{Face, FaceId};

struct Slot {
    generation: u32,
    face: Option<Face>,
}

#[derive(Default)]
pub struct FaceForest {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<FaceId>,
    live: usize,
}

impl FaceForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a permanent base face.
    pub fn insert_root(&mut self, face: Face) -> FaceId {
        let id = self.insert(face);
        self.roots.push(id);
        id
    }

    pub fn roots(&self) -> &[FaceId] {
        &self.roots
    }

    pub fn get(&self, id: FaceId) -> Option<&Face> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.face.as_ref())
    }

    pub fn contains(&self, id: FaceId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live faces, roots included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Attach four new children to a leaf. Returns `None`, inserting
    /// nothing, if `parent` is stale or already expanded.
    pub fn attach_children(&mut self, parent: FaceId, children: [Face; 4]) -> Option<[FaceId; 4]> {
        if !self.get(parent).is_some_and(Face::is_leaf) {
            return None;
        }
        let ids = children.map(|mut child| {
            child.parent = Some(parent);
            self.insert(child)
        });
        if let Some(face) = self.get_mut(parent) {
            face.children = Some(ids);
        }
        Some(ids)
    }

    /// Free every descendant of `id`, deepest first, and make `id` a leaf
    /// again. Returns the number of faces freed.
    pub fn collapse(&mut self, id: FaceId) -> usize {
        let Some(children) = self.get_mut(id).and_then(|face| face.children.take()) else {
            return 0;
        };
        let mut freed = 0;
        for child in children {
            freed += self.collapse(child);
            if self.remove(child).is_some() {
                freed += 1;
            }
        }
        freed
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.face.as_ref().map(|face| {
                let id = FaceId {
                    index: index as u32,
                    generation: slot.generation,
                };
                (id, face)
            })
        })
    }

    /// Deepest level of any live face.
    pub fn max_level(&self) -> u8 {
        self.iter().map(|(_, face)| face.level).max().unwrap_or(0)
    }

    fn get_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.face.as_mut())
    }

    fn insert(&mut self, face: Face) -> FaceId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.face = Some(face);
            return FaceId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            face: Some(face),
        });
        FaceId {
            index,
            generation: 0,
        }
    }

    fn remove(&mut self, id: FaceId) -> Option<Face> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let face = slot.face.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(face)
    }
}
