use friendship::application_port::*;
use friendship::domain_model::*;
use friendship::logger::*;
use friendship::server::*;
use friendship::settings::*;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct PairCheck {
    is_friends_with: bool,
    has_blocked: bool,
    is_blocked_by: bool,
}

async fn run(
    service: &dyn FriendshipService,
    server: &Server,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Migrate => server.migrate().await?,
        Command::Befriend(p) => print_json(&service.befriend(&p.actor, &p.target).await?)?,
        Command::Unfriend(p) => {
            service.unfriend(&p.actor, &p.target).await?;
            print_json(&serde_json::json!({ "removed": true }))?;
        }
        Command::Accept(p) => {
            print_json(&service.accept_friend_request(&p.actor, &p.target).await?)?
        }
        Command::Deny(p) => print_json(&service.deny_friend_request(&p.actor, &p.target).await?)?,
        Command::Block(p) => {
            print_json(&service.block_friend_request(&p.actor, &p.target).await?)?
        }
        Command::Unblock(p) => {
            print_json(&service.unblock_friend_request(&p.actor, &p.target).await?)?
        }
        Command::Show(p) => print_json(&service.get_friendship(&p.actor, &p.target).await?)?,
        Command::Check { pair, status } => print_json(&PairCheck {
            is_friends_with: service
                .is_friends_with(&pair.actor, &pair.target, status)
                .await?,
            has_blocked: service.has_blocked(&pair.actor, &pair.target).await?,
            is_blocked_by: service.is_blocked_by(&pair.actor, &pair.target).await?,
        })?,
        Command::List {
            actor,
            status,
            page,
        } => {
            let page = Page::new(page.limit, page.offset);
            print_json(&service.get_friendships(&actor, status, page).await?)?
        }
        Command::Requests { actor } => print_json(&service.get_friend_requests(&actor).await?)?,
        Command::Sent { actor, page } => {
            let page = Page::new(page.limit, page.offset);
            print_json(&service.get_sent_friendships(&actor, page).await?)?
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let server = Server::try_new(&project_settings).await?;
    let result = run(server.friendship_service.as_ref(), &server, cli.command).await;
    server.shutdown().await;

    if let Err(e) = &result {
        error!("{e}");
    }
    result
}
