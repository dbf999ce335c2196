// In: src/placement/assembler.rs

use super::{GroupPlacementIndex, HashBucketEnvelopes, HashBucketGroup, ObjectRef, ObjectStore};
use crate::error::BucketError;

/// **CONTRACT:** Turns the per-bucket envelope lists of one task into placed
/// groups.
///
/// `buckets` is `None` when the task read no data. The returned index always
/// has `num_groups` slots. The returned references are every object this call
/// created, in ascending group order.
///
/// Placement is not transactional. If a `put` fails partway, the error carries
/// no references and groups placed before the failure remain in the store
/// unreferenced. A retried task places fresh copies; reclaiming the orphans is
/// the store's concern.
pub trait GroupAssembler: Send + Sync {
    fn place(
        &self,
        buckets: Option<HashBucketEnvelopes>,
        num_buckets: usize,
        num_groups: usize,
    ) -> Result<(GroupPlacementIndex, Vec<ObjectRef>), BucketError>;
}

/// Maps a hash bucket to its group.
pub fn hash_bucket_to_group(hash_bucket: usize, num_groups: usize) -> usize {
    hash_bucket % num_groups
}

/// Places group `g` = every bucket `b` with `b % num_groups == g`, one object
/// per non-empty group.
#[derive(Debug)]
pub struct ModuloGroupAssembler<S> {
    store: S,
}

impl<S: ObjectStore> ModuloGroupAssembler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ObjectStore> GroupAssembler for ModuloGroupAssembler<S> {
    fn place(
        &self,
        buckets: Option<HashBucketEnvelopes>,
        num_buckets: usize,
        num_groups: usize,
    ) -> Result<(GroupPlacementIndex, Vec<ObjectRef>), BucketError> {
        if num_groups == 0 {
            return Err(BucketError::InvalidArgument(
                "num_groups must be positive".to_string(),
            ));
        }
        let mut placement = GroupPlacementIndex::new(num_groups);
        let mut object_refs = Vec::new();

        let buckets = match buckets {
            Some(buckets) => buckets,
            None => return Ok((placement, object_refs)),
        };
        if buckets.len() != num_buckets {
            return Err(BucketError::InvalidArgument(format!(
                "Expected {} hash buckets but got {}",
                num_buckets,
                buckets.len()
            )));
        }

        let mut groups: Vec<Option<HashBucketGroup>> = (0..num_groups).map(|_| None).collect();
        for (hash_bucket, slot) in buckets.into_iter().enumerate() {
            let envelopes = match slot {
                Some(envelopes) if !envelopes.is_empty() => envelopes,
                _ => continue,
            };
            let group_index = hash_bucket_to_group(hash_bucket, num_groups);
            groups[group_index]
                .get_or_insert_with(|| HashBucketGroup::new(group_index, num_buckets))
                .set_bucket(hash_bucket, envelopes);
        }

        for group in groups.into_iter().flatten() {
            let group_index = group.group_index();
            let obj_ref = match self.store.put(group) {
                Ok(obj_ref) => obj_ref,
                Err(err) => {
                    if !object_refs.is_empty() {
                        log::warn!(
                            "Placing group {} failed; {} earlier group object(s) left unreferenced: {:?}",
                            group_index,
                            object_refs.len(),
                            object_refs
                        );
                    }
                    return Err(err);
                }
            };
            log::debug!("Placed hash bucket group {} as {}", group_index, obj_ref);
            placement.set(group_index, obj_ref.clone());
            object_refs.push(obj_ref);
        }
        Ok((placement, object_refs))
    }
}
