use tracing::debug;

use super::{LibraryError, LibraryEvent, Observers, Reader, ReaderId, SubscriptionId};

/// Ordered set of configured readers with exactly one default when non-empty.
///
/// The registry performs no I/O; callers persist after every mutation.
#[derive(Debug, Default)]
pub struct ReaderRegistry {
    readers: Vec<Reader>,
    observers: Observers,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from persisted readers, repairing the default flag.
    ///
    /// The first reader flagged default keeps the flag; if none is flagged the
    /// first reader becomes default.
    pub fn from_readers(readers: Vec<Reader>) -> Self {
        let mut registry = Self::new();
        registry.replace_all(readers);
        registry
    }

    /// Swap in a freshly loaded reader list, keeping subscribers.
    ///
    /// Duplicate ids are dropped. No events are emitted.
    pub fn replace_all(&mut self, mut readers: Vec<Reader>) {
        let mut seen: Vec<ReaderId> = Vec::with_capacity(readers.len());
        readers.retain(|reader| {
            if seen.contains(&reader.id) {
                return false;
            }
            seen.push(reader.id.clone());
            true
        });
        let keep = readers.iter().position(|reader| reader.is_default).unwrap_or(0);
        for (index, reader) in readers.iter_mut().enumerate() {
            reader.is_default = index == keep;
        }
        self.readers = readers;
    }

    pub fn readers(&self) -> &[Reader] {
        &self.readers
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub fn find(&self, id: &ReaderId) -> Option<&Reader> {
        self.readers.iter().find(|reader| &reader.id == id)
    }

    /// Look a reader up by exact id, then by case-insensitive name.
    pub fn find_by_id_or_name(&self, needle: &str) -> Option<&Reader> {
        self.readers
            .iter()
            .find(|reader| reader.id.as_str() == needle)
            .or_else(|| {
                self.readers
                    .iter()
                    .find(|reader| reader.name.eq_ignore_ascii_case(needle))
            })
    }

    pub fn default_reader(&self) -> Option<&Reader> {
        self.readers.iter().find(|reader| reader.is_default)
    }

    /// Default reader, or the first reader if the flag is somehow missing.
    pub fn default_or_first(&self) -> Option<&Reader> {
        self.default_reader().or_else(|| self.readers.first())
    }

    /// Append a reader; the first reader added becomes default.
    pub fn add(&mut self, mut reader: Reader) -> ReaderId {
        reader.is_default = self.readers.is_empty();
        let id = reader.id.clone();
        debug!(reader = %reader.name, id = %id, "Reader added");
        self.readers.push(reader);
        self.observers.emit(LibraryEvent::ReaderAdded(id.clone()));
        if self.readers.len() == 1 {
            self.observers
                .emit(LibraryEvent::DefaultReaderChanged(id.clone()));
        }
        id
    }

    /// Remove a reader, handing the default flag to the first remaining one.
    pub fn remove(&mut self, id: &ReaderId) -> Result<Reader, LibraryError> {
        let index = self
            .readers
            .iter()
            .position(|reader| &reader.id == id)
            .ok_or_else(|| LibraryError::ReaderNotFound(id.clone()))?;
        if self.readers.len() <= 1 {
            return Err(LibraryError::GuardedOperation);
        }
        let removed = self.readers.remove(index);
        self.observers
            .emit(LibraryEvent::ReaderRemoved(removed.id.clone()));
        if removed.is_default {
            let next = &mut self.readers[0];
            next.is_default = true;
            let next_id = next.id.clone();
            debug!(id = %next_id, "Default reader reassigned after removal");
            self.observers
                .emit(LibraryEvent::DefaultReaderChanged(next_id));
        }
        Ok(removed)
    }

    /// Mark one reader as default and clear the flag on all others.
    pub fn set_default(&mut self, id: &ReaderId) -> Result<(), LibraryError> {
        if self.find(id).is_none() {
            return Err(LibraryError::ReaderNotFound(id.clone()));
        }
        let changed = !self.find(id).is_some_and(|reader| reader.is_default);
        for reader in self.readers.iter_mut() {
            reader.is_default = &reader.id == id;
        }
        if changed {
            self.observers
                .emit(LibraryEvent::DefaultReaderChanged(id.clone()));
        }
        Ok(())
    }

    /// Change a reader's display name; its identifier is unaffected.
    pub fn rename(&mut self, id: &ReaderId, name: impl Into<String>) -> Result<(), LibraryError> {
        let reader = self
            .readers
            .iter_mut()
            .find(|reader| &reader.id == id)
            .ok_or_else(|| LibraryError::ReaderNotFound(id.clone()))?;
        reader.name = name.into();
        self.observers.emit(LibraryEvent::ReaderRenamed(id.clone()));
        Ok(())
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&LibraryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn reader(name: &str) -> Reader {
        Reader::new(name, format!("/opt/{name}"))
    }

    fn default_count(registry: &ReaderRegistry) -> usize {
        registry.readers().iter().filter(|r| r.is_default).count()
    }

    #[test]
    fn first_added_reader_becomes_default() {
        let mut registry = ReaderRegistry::new();
        let mut flagged = reader("b");
        flagged.is_default = true;
        let first = registry.add(reader("a"));
        registry.add(flagged);
        assert_eq!(registry.default_reader().unwrap().id, first);
        assert_eq!(default_count(&registry), 1);
    }

    #[test]
    fn removing_last_reader_is_guarded() {
        let mut registry = ReaderRegistry::new();
        let id = registry.add(reader("only"));
        assert_eq!(registry.remove(&id), Err(LibraryError::GuardedOperation));
        assert_eq!(registry.len(), 1);
        assert!(registry.find(&id).unwrap().is_default);
    }

    #[test]
    fn removing_default_promotes_first_remaining() {
        let mut registry = ReaderRegistry::new();
        let a = registry.add(reader("a"));
        let b = registry.add(reader("b"));
        let c = registry.add(reader("c"));
        registry.set_default(&c).unwrap();
        registry.remove(&c).unwrap();
        assert_eq!(registry.default_reader().unwrap().id, a);
        assert_eq!(default_count(&registry), 1);
        registry.remove(&a).unwrap();
        assert_eq!(registry.default_reader().unwrap().id, b);
    }

    #[test]
    fn removing_unknown_reader_reports_not_found() {
        let mut registry = ReaderRegistry::new();
        registry.add(reader("a"));
        let missing = ReaderId::new();
        assert_eq!(
            registry.remove(&missing),
            Err(LibraryError::ReaderNotFound(missing.clone()))
        );
        assert_eq!(
            registry.set_default(&missing),
            Err(LibraryError::ReaderNotFound(missing))
        );
    }

    #[test]
    fn exactly_one_default_after_mixed_operations() {
        let mut registry = ReaderRegistry::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d", "e"] {
            ids.push(registry.add(reader(name)));
            assert_eq!(default_count(&registry), 1);
        }
        for step in 0..12usize {
            let id = ids[step % ids.len()].clone();
            match step % 3 {
                0 => {
                    let _ = registry.set_default(&id);
                }
                1 => {
                    if registry.remove(&id).is_ok() {
                        ids.retain(|existing| existing != &id);
                    }
                }
                _ => {
                    ids.push(registry.add(reader("extra")));
                }
            }
            assert_eq!(default_count(&registry), 1);
        }
    }

    #[test]
    fn from_readers_repairs_default_flags() {
        let mut a = reader("a");
        let mut b = reader("b");
        a.is_default = false;
        b.is_default = false;
        let registry = ReaderRegistry::from_readers(vec![a.clone(), b.clone()]);
        assert_eq!(registry.default_reader().unwrap().id, a.id);

        a.is_default = true;
        b.is_default = true;
        let registry = ReaderRegistry::from_readers(vec![b.clone(), a.clone()]);
        assert_eq!(registry.default_reader().unwrap().id, b.id);
        assert_eq!(default_count(&registry), 1);

        assert!(ReaderRegistry::from_readers(Vec::new()).default_reader().is_none());
    }

    #[test]
    fn from_readers_drops_duplicate_ids() {
        let a = reader("a");
        let mut twin = a.clone();
        twin.name = "twin".into();
        let registry = ReaderRegistry::from_readers(vec![a.clone(), twin]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.readers()[0].name, "a");
    }

    #[test]
    fn rename_keeps_identity() {
        let mut registry = ReaderRegistry::new();
        let id = registry.add(reader("a"));
        registry.rename(&id, "Renamed").unwrap();
        assert_eq!(registry.find(&id).unwrap().name, "Renamed");
        assert_eq!(registry.find_by_id_or_name("renamed").unwrap().id, id);
        assert_eq!(registry.find_by_id_or_name(id.as_str()).unwrap().id, id);
    }

    #[test]
    fn mutations_notify_subscribers() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut registry = ReaderRegistry::new();
        registry.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        let a = registry.add(reader("a"));
        let b = registry.add(reader("b"));
        registry.set_default(&b).unwrap();
        registry.set_default(&b).unwrap();
        registry.remove(&b).unwrap();
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                LibraryEvent::ReaderAdded(a.clone()),
                LibraryEvent::DefaultReaderChanged(a.clone()),
                LibraryEvent::ReaderAdded(b.clone()),
                LibraryEvent::DefaultReaderChanged(b.clone()),
                LibraryEvent::ReaderRemoved(b),
                LibraryEvent::DefaultReaderChanged(a),
            ]
        );
    }
}
