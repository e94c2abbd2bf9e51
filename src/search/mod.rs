//! Record filters: department substring and masked-name matching.

pub mod department;
pub mod name;

use crate::model::MailRecord;

pub use department::{all_departments, filter_by_department};
pub use name::{filter_by_name, masked_forms, NameMatcher};

/// Optional department and name criteria applied together.
///
/// Both filters are pure and order-preserving, so applying them in
/// either order gives the same list.
#[derive(Debug, Clone, Default)]
pub struct MailQuery {
    pub department: Option<String>,
    pub name: Option<String>,
}

impl MailQuery {
    /// A query with no criteria keeps everything.
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.name.is_none()
    }

    /// Apply the department filter, then the name filter.
    pub fn apply(&self, records: &[MailRecord]) -> Vec<MailRecord> {
        let mut out = records.to_vec();
        if let Some(ref department) = self.department {
            out = filter_by_department(&out, department);
        }
        if let Some(ref name) = self.name {
            out = filter_by_name(&out, name);
        }
        tracing::debug!(before = records.len(), after = out.len(), "Applied mail query");
        out
    }
}
