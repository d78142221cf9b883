//! Request dispatch
//!
//! Maps each inbound request to the agent callback it triggers and the reply
//! the server expects back.

use crate::config::Identity;
use crate::session::Session;
use aiwolf_core::{Agent, BaseInfo, InboundMessage, Reply, Request, Result, WolfError};
use tracing::{debug, info};

/// Handle one message and produce its reply
pub async fn dispatch<A>(
    session: &mut Session,
    identity: &Identity,
    agent: &mut A,
    message: InboundMessage,
) -> Result<Reply>
where
    A: Agent + ?Sized,
{
    debug!("Dispatching {}", message.request);

    if message.request.is_update() {
        update(session, agent, &message).await?;
    }

    match &message.request {
        Request::Name => Ok(Reply::Text(identity.name.clone())),
        Request::Role => Ok(Reply::Text(identity.role.clone())),
        Request::Initialize => {
            initialize(session, agent, &message).await?;
            Ok(Reply::Empty)
        }
        Request::DailyInitialize => {
            session.watermark.reset();
            agent.day_start().await?;
            Ok(Reply::Empty)
        }
        Request::DailyFinish => Ok(Reply::Empty),
        Request::Finish => {
            agent.finish().await?;
            if session.finish_game() {
                info!(
                    "Game {} of {} finished",
                    session.games_finished(),
                    session.total_games()
                );
            } else {
                debug!("Ignoring FINISH without a matching INITIALIZE");
            }
            Ok(Reply::Empty)
        }
        Request::Vote => Ok(Reply::Target(agent.vote().await?)),
        Request::Attack => Ok(Reply::Target(agent.attack().await?)),
        Request::Guard => Ok(Reply::Target(agent.guard().await?)),
        Request::Divine => Ok(Reply::Target(agent.divine().await?)),
        Request::Talk => Ok(Reply::Text(agent.talk().await?.to_string())),
        Request::Whisper => Ok(Reply::Text(agent.whisper().await?.to_string())),
        Request::Other(name) => {
            debug!("Unrecognized request {}, treated as an update", name);
            Ok(Reply::Empty)
        }
    }
}

async fn initialize<A>(session: &mut Session, agent: &mut A, message: &InboundMessage) -> Result<()>
where
    A: Agent + ?Sized,
{
    let setting = message
        .game_setting
        .as_ref()
        .ok_or_else(|| WolfError::Protocol("INITIALIZE without gameSetting".into()))?;

    let mut base_info = BaseInfo::from_initialize(&message.game_info)?;
    base_info.merge_turn(&message.game_info);
    session.base_info = base_info;
    session.start_game();
    info!(
        "Game {} started as agent {} ({})",
        session.games_started(),
        session.base_info.agent_idx,
        session.base_info.my_role
    );

    let view = session
        .adapter
        .initialize_view(message, setting, &session.base_info)?;
    agent.initialize(&view, setting).await
}

async fn update<A>(session: &mut Session, agent: &mut A, message: &InboundMessage) -> Result<()>
where
    A: Agent + ?Sized,
{
    session.base_info.merge_turn(&message.game_info);
    let view = session.adapter.update_view(message, &session.base_info)?;
    agent.update(&view, &message.request).await
}
