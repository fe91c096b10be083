use crate::client::RebrandlyClient;
use crate::error::Result;
use crate::types::{parse_record, Account};

#[derive(Debug, Clone)]
pub struct AccountService {
    client: RebrandlyClient,
}

impl AccountService {
    pub fn new(client: RebrandlyClient) -> Self {
        Self { client }
    }

    /// Details of the account owning the API key.
    pub fn get_account(&self) -> Result<Account> {
        let response = self.client.get(&["account"], &[])?;
        parse_record("account", response)
    }
}
