#![allow(missing_docs)]

pub(crate) mod backend;
pub(crate) mod fakes;
pub(crate) mod html;
pub(crate) mod logs;

pub(crate) use backend::{FakeBackend, Reply, unreachable_origin};
pub(crate) use fakes::{log_in_reply, logged_in_client, test_client};
pub(crate) use html::{assert_valid_html, must_get_by_id, text_of};
pub(crate) use logs::LogCapture;
