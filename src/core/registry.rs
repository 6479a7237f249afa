use crate::domain::model::Specialities;
use crate::domain::ports::Request;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

/// An on-duty worker: its identifier, declared specialities and the open
/// channel orders are forwarded over.
#[derive(Clone)]
pub struct StaffMember {
    id: String,
    specialities: Specialities,
    channel: Arc<dyn Request>,
    lane: Arc<Mutex<bool>>,
}

impl StaffMember {
    pub fn new(id: impl Into<String>, specialities: Specialities, channel: Arc<dyn Request>) -> Self {
        Self {
            id: id.into(),
            specialities,
            channel,
            lane: Arc::new(Mutex::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn specialities(&self) -> &Specialities {
        &self.specialities
    }

    pub fn channel(&self) -> &Arc<dyn Request> {
        &self.channel
    }

    /// Held for the forward/result half of a relay so two orders sharing a
    /// worker never read each other's results. The flag is set while a body
    /// is out and cleared once its answer is read; a set flag on entry means
    /// an earlier exchange was cut short and the channel is out of step.
    pub(crate) fn lane(&self) -> &Arc<Mutex<bool>> {
        &self.lane
    }

    pub fn can_serve(&self, requested: &Specialities) -> bool {
        self.specialities.is_superset_of(requested)
    }

    /// True when both members wrap the very same channel.
    pub fn same_channel(&self, other: &StaffMember) -> bool {
        Arc::ptr_eq(&self.channel, &other.channel)
    }
}

impl fmt::Debug for StaffMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaffMember")
            .field("id", &self.id)
            .field("specialities", &self.specialities)
            .finish_non_exhaustive()
    }
}

/// Staff currently on duty, kept in the order they first came on duty.
///
/// Re-registering an id replaces the entry in place. All access goes through
/// a read/write lock that is never held across an await point.
#[derive(Debug, Default)]
pub struct StaffRegistry {
    members: RwLock<Vec<StaffMember>>,
}

impl StaffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<StaffMember>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<StaffMember>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Puts `member` on duty, returning the entry it replaced.
    pub fn register(&self, member: StaffMember) -> Option<StaffMember> {
        let mut members = self.write();
        match members.iter_mut().find(|existing| existing.id == member.id) {
            Some(existing) => Some(std::mem::replace(existing, member)),
            None => {
                members.push(member);
                None
            }
        }
    }

    /// Takes `id` off duty. Unknown ids are ignored.
    pub fn deregister(&self, id: &str) -> Option<StaffMember> {
        let mut members = self.write();
        let position = members.iter().position(|member| member.id == id)?;
        Some(members.remove(position))
    }

    /// Removes `member` only if its id still maps to the same channel, so a
    /// worker that re-registered meanwhile keeps its fresh entry.
    pub fn evict(&self, member: &StaffMember) -> bool {
        let mut members = self.write();
        match members
            .iter()
            .position(|existing| existing.id == member.id && existing.same_channel(member))
        {
            Some(position) => {
                members.remove(position);
                true
            }
            None => false,
        }
    }

    /// Snapshot of every on-duty member in registry order.
    pub fn entries(&self) -> Vec<StaffMember> {
        self.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<StaffMember> {
        self.read().iter().find(|member| member.id == id).cloned()
    }

    /// First member in registry order declaring every requested speciality.
    pub fn find_first_capable(&self, requested: &Specialities) -> Option<StaffMember> {
        self.read()
            .iter()
            .find(|member| member.can_serve(requested))
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().iter().any(|member| member.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.read().iter().map(|member| member.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
