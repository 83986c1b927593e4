use crate::auth::{CredentialService, TokenService};
use crate::config::Config;
use crate::store::JsonFileStore;
use crate::tasks::TaskService;

/// Services shared by every worker, built once from the configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub credentials: CredentialService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let credentials = CredentialService::new(
            JsonFileStore::new(&config.users_file),
            tokens.clone(),
            config.bcrypt_cost,
        );
        let tasks = TaskService::new(JsonFileStore::new(&config.tasks_file));

        Self {
            config,
            tokens,
            credentials,
            tasks,
        }
    }
}
