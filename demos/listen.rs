use chatsock::{
    ws::{ConnectURL, Event},
    Client, Config, Error, Handler,
};

struct Printer;

#[async_trait::async_trait]
impl Handler for Printer {
    async fn on_event(&mut self, event: Event) {
        log::info!("Received {} event #{}: {}", event.event, event.seq, event.data);
    }

    async fn on_first_connect(&mut self) {
        log::info!("Connected");
    }

    async fn on_reconnect(&mut self) {
        log::info!("Reconnected, reload recent state here");
    }

    async fn on_missed_events(&mut self) {
        log::warn!("Events missed, reload everything here");
    }

    async fn on_error(&mut self, err: Error) {
        log::warn!("Websocket error: {}", err);
    }

    async fn on_close(&mut self, fail_count: u32) {
        log::warn!("Websocket closed, {} failures in a row", fail_count);
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let site = std::env::var("CHAT_SITE_URL")
        .map_err(|_| {
            println!("No CHAT_SITE_URL env var or invalid");
            std::process::exit(1);
        })
        .unwrap();
    let token = std::env::var("CHAT_TOKEN").ok();

    let config = Config::default();
    let url = ConnectURL::from_site_url(&site, &config).unwrap();

    let client = Client::new(config, Printer);
    client.initialize_with(url, token);

    tokio::signal::ctrl_c().await.unwrap();

    client.close();
}
