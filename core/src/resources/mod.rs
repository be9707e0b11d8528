//! One module per Toggl resource.
//!
//! Each handle borrows the `TogglClient`, owns the field tables for its
//! parameter structs, and maps every remote endpoint to one method.

mod invitations;
mod me;
mod projects;
mod tags;
mod time_entries;

pub use invitations::{InvitationBody, Invitations};
pub use me::{
    ConfirmLostPassword, LostPassword, Me, MeProjectsQuery, PaginatedProjectsQuery,
    ResetLostPassword, TasksQuery, UpdateMe,
};
pub use projects::{AddProjectUser, ProjectBody, ProjectListQuery, ProjectUsers, Projects, UpdateProjectUser};
pub use tags::{TagBody, Tags};
pub use time_entries::{TimeEntries, TimeEntryBody, TimeEntryListQuery};

/// Comma-joined id list as used in bulk endpoints, e.g. `1,2,3`.
pub(crate) fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}
