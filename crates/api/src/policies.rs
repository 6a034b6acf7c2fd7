//! The permission table the server ships with.

use folio_core::permissions::{Action, Policies, Rule, Tier};
use folio_core::roles::Role;

pub const SHELVE: Action = Action::Custom("shelve");
pub const UNSHELVE: Action = Action::Custom("unshelve");

pub const CAN_VIEW_ARTICLES: &str = "articles.can_view";
pub const CAN_CREATE_ARTICLES: &str = "articles.can_create";
pub const CAN_EDIT_ARTICLES: &str = "articles.can_edit";
pub const CAN_DELETE_ARTICLES: &str = "articles.can_delete";

pub const FEED: &str = "feed";
pub const FOLLOW: &str = "follow";

/// Permission key for the dashboard of `role`.
pub fn dashboard_kind(role: Role) -> &'static str {
    match role {
        Role::Admin => "dashboard.admin",
        Role::Librarian => "dashboard.librarian",
        Role::Member => "dashboard.member",
    }
}

const CURATORS: &[Role] = &[Role::Admin, Role::Librarian];
const SHELVERS: &[Role] = &[Role::Librarian, Role::Admin];

/// Build the default policy table.
///
/// ```text
/// author, book          open-read
/// library               open-read; writes need admin|librarian;
///                       shelve/unshelve need librarian|admin
/// post, comment         open-read + owner for writes
/// article               articles.can_view|can_create|can_edit|can_delete
/// feed, follow          authenticated
/// dashboard.<role>      matching role
/// ```
pub fn default_policies() -> Policies {
    Policies::new()
        .with("author", [Rule::all(Tier::OpenRead)])
        .with("book", [Rule::all(Tier::OpenRead)])
        .with(
            "library",
            [
                Rule::only(Action::READ, Tier::OpenRead),
                Rule::only(Action::WRITE, Tier::Roles(CURATORS)),
                Rule::only(&[SHELVE, UNSHELVE], Tier::Roles(SHELVERS)),
            ],
        )
        .with("post", [Rule::all(Tier::OpenRead), Rule::all(Tier::Owner)])
        .with("comment", [Rule::all(Tier::OpenRead), Rule::all(Tier::Owner)])
        .with(
            "article",
            [
                Rule::only(Action::READ, Tier::Capability(CAN_VIEW_ARTICLES)),
                Rule::only(&[Action::Create], Tier::Capability(CAN_CREATE_ARTICLES)),
                Rule::only(Action::EDIT, Tier::Capability(CAN_EDIT_ARTICLES)),
                Rule::only(&[Action::Delete], Tier::Capability(CAN_DELETE_ARTICLES)),
            ],
        )
        .with(FEED, [Rule::all(Tier::Authenticated)])
        .with(FOLLOW, [Rule::all(Tier::Authenticated)])
        .with(
            dashboard_kind(Role::Admin),
            [Rule::all(Tier::Roles(&[Role::Admin]))],
        )
        .with(
            dashboard_kind(Role::Librarian),
            [Rule::all(Tier::Roles(&[Role::Librarian]))],
        )
        .with(
            dashboard_kind(Role::Member),
            [Rule::all(Tier::Roles(&[Role::Member]))],
        )
}
