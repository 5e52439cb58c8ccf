pub mod hash_password;
pub mod server;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword(hash_password::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Server(args) => server::handle(args).await,
            Self::HashPassword(args) => hash_password::handle(&args),
        }
    }
}
