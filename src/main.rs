use rimagen::{AspectRatio, Config, ImageEditRequest, VertexClient};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    rimagen::logger::init_with_config(
        rimagen::logger::LoggerConfig::development()
            .with_level(rimagen::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking Google Cloud environment...");

    match env::var("GOOGLE_CLOUD_PROJECT") {
        Ok(project) => log::info!("GOOGLE_CLOUD_PROJECT: {}", project),
        Err(_) => log::error!("❌ GOOGLE_CLOUD_PROJECT not set, client creation will fail"),
    }
    match env::var("GOOGLE_CLOUD_LOCATION") {
        Ok(location) => log::info!("GOOGLE_CLOUD_LOCATION: {}", location),
        Err(_) => log::warn!("⚠️  GOOGLE_CLOUD_LOCATION not set"),
    }
    if env::var("VERTEX_ACCESS_TOKEN").is_err() && env::var("GOOGLE_ACCESS_TOKEN").is_err() {
        log::warn!("⚠️  No access token in environment, authentication will fail");
    } else {
        log::info!("✅ Access token found in environment");
    }

    let config = Config::from_env();
    let has_bucket = config.storage.bucket.is_some();

    log::info!("🔄 Creating Vertex client...");
    let client = if has_bucket {
        VertexClient::with_storage(config)?
    } else {
        log::warn!("⚠️  IMAGE_BUCKET not set, recontextualization will be unavailable");
        VertexClient::new(config)?
    };
    log::info!("✅ Vertex client initialized successfully");

    // Test 1: Prompt-based generation
    log::info!("🎨 Testing image generation...");
    match client
        .generate_from_prompt(
            "A serene landscape with mountains and a lake at sunset",
            "digital art style, golden hour",
            None,
            2,
            "people",
            AspectRatio::Landscape,
        )
        .await
    {
        Ok(uris) => {
            log::info!("✅ Generation successful, {} images", uris.len());
            for uri in &uris {
                log::info!("🖼️  {}", uri);
            }
        }
        Err(e) => log::error!("❌ Generation failed: {}", e),
    }

    // Test 2: Single-image convenience path
    log::info!("🎨 Testing single-image generation...");
    match client
        .generate_single_image("A friendly robot barista, studio photo")
        .await
    {
        Ok(image_bytes) => {
            let filename = format!("generated_image_{}.png", chrono::Utc::now().timestamp());
            match fs::write(&filename, &image_bytes) {
                Ok(_) => log::info!("💾 Image saved to: {}", filename),
                Err(e) => log::error!("❌ Failed to save image: {}", e),
            }
        }
        Err(e) => log::error!("❌ Single-image generation failed: {}", e),
    }

    // Test 3: Editing, if a reference image was provided
    if let Ok(reference_path) = env::var("EDIT_REFERENCE_IMAGE") {
        log::info!("✏️  Testing image editing with {}...", reference_path);
        let reference_image = fs::read(&reference_path)?;
        let request =
            ImageEditRequest::new("Replace the background with a beach", reference_image)
                .with_count(1);

        match client.edit_image(&request).await {
            Ok(uris) => {
                log::info!("✅ Edit successful, {} images", uris.len());
                for uri in &uris {
                    log::info!("🖼️  {}", uri);
                }
            }
            Err(e) => log::error!("❌ Edit failed: {}", e),
        }
    } else {
        log::info!("⏭️  EDIT_REFERENCE_IMAGE not set, skipping edit test");
    }

    log::info!("🎉 All tests completed!");
    Ok(())
}
