//! Fixture factory and builders

use crate::batch::{RecordBatch, TypedBatch};
use crate::collect::collect_root;
use crate::error::{FactoryError, FactoryResult};
use crate::synth::{BackendOverrides, NonZeroSynthesizer, Synthesizer};
use crate::wiring::{resolve, Batch};
use sg_core::{Config, CoreError, GraphGroup, MetadataCache, Record, Registration};
use sg_db::Database;
use std::any::TypeId;
use std::sync::Arc;

/// Builds and inserts values of `T` together with their associations.
///
/// ```ignore
/// let mut users = Factory::<User>::new(&config);
/// let mut categories = Factory::<Category>::new(&config);
///
/// let mut user = users.build().get()?;
/// let category = categories.build().with_one(&mut user).insert(&db).await?;
/// assert_eq!(category.user_id, user.id);
/// ```
pub struct Factory<T> {
    cache: MetadataCache,
    synthesizer: Box<dyn Synthesizer>,
    blueprint: Option<fn(usize, &mut T)>,
    index: usize,
}

impl<T: Record + Default> Factory<T> {
    pub fn new(config: &Config) -> Self {
        Self {
            cache: MetadataCache::new(config.plural_suffix.clone()),
            synthesizer: Box::new(NonZeroSynthesizer::new(config.seed)),
            blueprint: None,
            index: 0,
        }
    }

    /// Template applied to every new value, called with the value's index.
    pub fn blueprint(mut self, blueprint: fn(usize, &mut T)) -> Self {
        self.blueprint = Some(blueprint);
        self
    }

    /// Replace the default synthesizer.
    pub fn synthesizer(mut self, synthesizer: impl Synthesizer + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    /// Rewind the blueprint index and the synthesizer.
    pub fn reset(&mut self) {
        self.index = 0;
        self.synthesizer.reset();
    }

    /// Number of values produced since creation or the last reset.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn build(&mut self) -> Builder<'_, T> {
        Builder {
            pending: Pending::new(self, 1),
        }
    }

    /// Build `count` values; zero is an error reported by `get`/`insert`.
    pub fn build_list(&mut self, count: usize) -> ListBuilder<'_, T> {
        ListBuilder {
            pending: Pending::new(self, count),
        }
    }

    fn template(&mut self) -> T {
        let mut value = T::default();
        if let Some(blueprint) = self.blueprint {
            blueprint(self.index, &mut value);
        }
        self.index += 1;
        value
    }
}

/// State shared by both builders. The first error encountered wins and is
/// reported when the build is finished.
struct Pending<'a, T> {
    factory: &'a mut Factory<T>,
    values: Vec<T>,
    root: FactoryResult<Registration<T>>,
    associations: Vec<GraphGroup<Batch<'a>>>,
}

impl<'a, T: Record + Default> Pending<'a, T> {
    fn new(factory: &'a mut Factory<T>, count: usize) -> Self {
        let root = if count == 0 {
            Err(FactoryError::InvalidCount(count))
        } else {
            factory.cache.register::<T>().map_err(FactoryError::from)
        };
        let values = (0..count).map(|_| factory.template()).collect();
        Self {
            factory,
            values,
            root,
            associations: Vec::new(),
        }
    }

    fn fail(&mut self, err: FactoryError) {
        if self.root.is_ok() {
            self.root = Err(err);
        }
    }

    fn overwrite(&mut self, f: impl Fn(usize, &mut T)) {
        for (index, value) in self.values.iter_mut().enumerate() {
            f(index, value);
        }
    }

    fn associate<A: Record>(&mut self, values: impl IntoIterator<Item = &'a mut A>) {
        if self.root.is_err() {
            return;
        }
        if TypeId::of::<A>() == TypeId::of::<T>() {
            self.fail(FactoryError::RootAssociation {
                type_name: T::TYPE_NAME.to_string(),
            });
            return;
        }
        match self.factory.cache.register::<A>() {
            Ok(reg) => self.associations.push(GraphGroup {
                metadata: reg.metadata,
                values: Box::new(TypedBatch::borrowed(reg.schema, values)),
            }),
            Err(err) => self.fail(err.into()),
        }
    }

    fn get(self) -> FactoryResult<Vec<T>> {
        let root = self.root?;
        let mut batch = TypedBatch::owned(root.schema, self.values);
        for index in 0..batch.len() {
            batch.synthesize(
                index,
                &mut *self.factory.synthesizer,
                &root.metadata.omitted_fields,
            )?;
        }
        let group: Batch<'_> = Box::new(batch);
        collect_root(vec![group])
    }

    async fn insert(self, db: &dyn Database, single: bool) -> FactoryResult<Vec<T>> {
        let root = self.root?;
        let synth = &mut *self.factory.synthesizer;

        if !self.associations.is_empty() {
            let mut groups = self.associations;
            groups.push(GraphGroup {
                metadata: root.metadata,
                values: Box::new(TypedBatch::owned(root.schema, self.values)),
            });
            let inserted = resolve(groups, db, synth).await?;
            return collect_root(inserted);
        }

        let storage = root.metadata.storage_name.clone();
        let mut batch = TypedBatch::owned(Arc::clone(&root.schema), self.values);
        let mut source = BackendOverrides { db, inner: synth };
        for index in 0..batch.len() {
            batch.synthesize(index, &mut source, &root.metadata.omitted_fields)?;
        }
        {
            let mut rows = batch.rows();
            match rows.as_mut_slice() {
                [row] if single => db.insert_one(&storage, &mut **row).await?,
                rows => db.insert_many(&storage, rows).await?,
            }
        }
        log::debug!("Inserted {} {} values into {}", batch.len(), T::TYPE_NAME, storage);
        let group: Batch<'_> = Box::new(batch);
        collect_root(vec![group])
    }
}

/// Builder for a single value.
pub struct Builder<'a, T> {
    pending: Pending<'a, T>,
}

impl<'a, T: Record + Default> Builder<'a, T> {
    /// Modify the value before synthesis; set fields are kept.
    pub fn overwrite(mut self, f: impl Fn(&mut T)) -> Self {
        self.pending.overwrite(|_, value| f(value));
        self
    }

    /// Attach one associated value, wired and inserted in place.
    pub fn with_one<A: Record>(mut self, value: &'a mut A) -> Self {
        self.pending.associate(std::iter::once(value));
        self
    }

    /// Attach several associated values of one type.
    pub fn with_many<A: Record>(mut self, values: &'a mut [A]) -> Self {
        self.pending.associate(values.iter_mut());
        self
    }

    /// The synthesized value, without touching storage or associations.
    pub fn get(self) -> FactoryResult<T> {
        single(self.pending.get()?)
    }

    /// Insert associations and the value, returning the inserted value.
    pub async fn insert(self, db: &dyn Database) -> FactoryResult<T> {
        single(self.pending.insert(db, true).await?)
    }
}

/// Builder for a list of values.
pub struct ListBuilder<'a, T> {
    pending: Pending<'a, T>,
}

impl<'a, T: Record + Default> ListBuilder<'a, T> {
    /// Apply `f` to every value before synthesis.
    pub fn overwrite(mut self, f: impl Fn(&mut T)) -> Self {
        self.pending.overwrite(|_, value| f(value));
        self
    }

    /// Apply `f` to every value together with its position in the list.
    pub fn overwrite_each(mut self, f: impl Fn(usize, &mut T)) -> Self {
        self.pending.overwrite(f);
        self
    }

    /// Attach one associated value, wired and inserted in place.
    pub fn with_one<A: Record>(mut self, value: &'a mut A) -> Self {
        self.pending.associate(std::iter::once(value));
        self
    }

    /// Attach several associated values of one type.
    pub fn with_many<A: Record>(mut self, values: &'a mut [A]) -> Self {
        self.pending.associate(values.iter_mut());
        self
    }

    /// The synthesized values, without touching storage or associations.
    pub fn get(self) -> FactoryResult<Vec<T>> {
        self.pending.get()
    }

    /// Insert associations and the values, returning the inserted values.
    pub async fn insert(self, db: &dyn Database) -> FactoryResult<Vec<T>> {
        self.pending.insert(db, false).await
    }
}

fn single<T: Record>(mut values: Vec<T>) -> FactoryResult<T> {
    values.pop().ok_or_else(|| {
        CoreError::Conversion {
            type_name: T::TYPE_NAME.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
