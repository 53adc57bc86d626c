//! Smoke client: creates one advertisement against a running server, edits
//! its description, then reads it back, printing each status line and body.

use tracing::info;

use advert_types::api::{
    CreateAdvertisementRequest, CreateAdvertisementResponse, UpdateAdvertisementRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advert_client=info".into()),
        )
        .init();

    let base_url = std::env::var("ADVERT_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    info!("Talking to {}", base_url);

    let response = client
        .post(format!("{}/advertisements/", base_url))
        .json(&CreateAdvertisementRequest {
            header: "adv_1".into(),
            description: "adv_1 text_1".into(),
            user: "user_1".into(),
        })
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await?;
    println!("{}", status.as_u16());
    println!("{}", text);

    // A repeat run hits the duplicate header; there is nothing to read back then.
    let Ok(created) = serde_json::from_str::<CreateAdvertisementResponse>(&text) else {
        return Ok(());
    };

    let response = client
        .patch(format!("{}/advertisements/user_1/{}", base_url, created.id))
        .json(&UpdateAdvertisementRequest {
            header: None,
            description: Some("adv_1 text_2".into()),
            user: "user_1".into(),
        })
        .send()
        .await?;
    println!("{}", response.status().as_u16());
    println!("{}", response.text().await?);

    let response = client
        .get(format!("{}/advertisements/{}", base_url, created.id))
        .send()
        .await?;
    println!("{}", response.status().as_u16());
    println!("{}", response.text().await?);

    Ok(())
}
