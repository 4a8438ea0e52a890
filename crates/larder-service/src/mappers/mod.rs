//! Entity-DTO mappers.

use crate::dto::{UserListResponse, UserResponse};
use larder_core::{Page, PageRequest, User};

/// Converts a page of users to a user list response.
impl From<Page<User>> for UserListResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            users: page.content.into_iter().map(UserResponse::from).collect(),
            page: page.info.page,
            size: page.info.size,
            total_elements: page.info.total_elements,
            total_pages: page.info.total_pages,
        }
    }
}

/// Builds a page from one slice of users and the table-wide count.
#[must_use]
pub fn to_page(users: Vec<User>, request: PageRequest, total: u64) -> Page<User> {
    Page::new(users, request, total)
}
