use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::messaging::reply;
use crate::domain::entities::{Command, CommandResult, Invocation};
use crate::domain::traits::{AuthStore, DeviceClient, Reply};

/// Routes invocations to device requests and formats the outcome.
///
/// Every failure ends the invocation with a reply; nothing propagates.
pub struct CommandService {
    auth: Arc<dyn AuthStore>,
    device: Arc<dyn DeviceClient>,
}

impl CommandService {
    pub fn new(auth: Arc<dyn AuthStore>, device: Arc<dyn DeviceClient>) -> Self {
        Self { auth, device }
    }

    pub async fn handle(&self, invocation: &Invocation) -> Reply {
        let identity = invocation.identity();

        let command = match Command::parse(&invocation.name, &invocation.args) {
            Ok(command) => command,
            Err(CommandError::NotFound(name)) => {
                tracing::debug!("Unknown command /{} from {}", name, identity);
                return Reply::text(CommandError::NotFound(name).to_string());
            }
            // Auth gate first, so unauthorized users never see usage hints
            Err(e) => {
                let authorized = self.auth.is_authorized(identity).await;
                if Command::normalize_name(&invocation.name) == "auth" && authorized {
                    return Reply::text(reply::AUTH_ALREADY);
                }
                if !Command::is_public_name(&invocation.name) && !authorized {
                    return Reply::text(reply::NOT_AUTHORIZED);
                }
                tracing::debug!("Invalid arguments for /{} from {}: {:?}", invocation.name, identity, e);
                return Reply::text(e.to_string());
            }
        };

        tracing::info!(
            "/{} from {} in chat {} ({:?})",
            command.name(),
            identity,
            invocation.chat_id,
            invocation.source
        );

        if command.is_privileged() && !self.auth.is_authorized(identity).await {
            tracing::info!("Rejected /{} from unauthorized user {}", command.name(), identity);
            return Reply::text(reply::NOT_AUTHORIZED);
        }

        match &command {
            Command::Start => Reply::text(reply::welcome(&invocation.sender.display_name())),
            Command::Help => Reply::text(reply::help()),
            Command::Auth { secret } => Reply::text(self.authorize(identity, secret).await),
            Command::Panel => Reply::text(reply::PANEL_TITLE).with_keyboard(reply::panel_keyboard()),
            _ => Reply::text(self.dispatch(&command).await),
        }
    }

    async fn authorize(&self, identity: &str, secret: &str) -> &'static str {
        if self.auth.is_authorized(identity).await {
            return reply::AUTH_ALREADY;
        }
        if self.auth.authorize(identity, secret).await {
            tracing::info!("User {} authorized", identity);
            reply::AUTH_OK
        } else {
            tracing::info!("User {} supplied a wrong password", identity);
            reply::AUTH_REJECTED
        }
    }

    async fn dispatch(&self, command: &Command) -> String {
        let Some(request) = command.device_request() else {
            return String::new();
        };

        let result: CommandResult = self.device.request(request.capability, &request.params).await;
        match &result {
            Err(e) if e.is_upstream() => {
                tracing::warn!("Device reported an error for /{}: {}", command.name(), e)
            }
            Err(e) => tracing::error!("Device request for /{} failed: {}", command.name(), e),
            Ok(fields) => tracing::debug!("/{} returned {} fields", command.name(), fields.len()),
        }

        reply::format_result(command, &result)
    }
}
