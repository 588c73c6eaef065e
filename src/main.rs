use mailgate::{config::get_or_init_config, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        mailgate::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        mailgate::init_dbg_tracing();
    }

    let config = get_or_init_config();
    let App {
        app_state,
        listener,
    } = App::build_from_config(config).await?;

    mailgate::serve(listener, app_state).await?;

    Ok(())
}
