// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::Result;
use crate::models::Activity;
use async_trait::async_trait;

pub mod strava;

/// Result of probing the account-identity endpoint with a saved token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    Valid,
    Unauthorized,
    /// Any other failure, transport errors included
    Failed(String),
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn check_token(&self, access_token: &str) -> TokenCheck;

    async fn fetch_all(&self, access_token: &str) -> Result<Vec<Activity>>;
}
