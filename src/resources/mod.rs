/**
 * This module contains all logic for loading external assets and turning
 * CPU-side scene data into GPU resources.
 */
pub mod mesh;
pub mod texture;

use std::path::Path;

use anyhow::Context as _;

use crate::data_structures::texture::{Environment, tonemap_hdr};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &Path) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no global `window`")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read window origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    Ok(base.join(&file_name.to_string_lossy())?)
}

/// Reads an asset as raw bytes: from disk on native, over HTTP relative to
/// the page origin on the web.
pub async fn load_binary(file_name: &Path) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(file_name)
        .await
        .with_context(|| format!("cannot read {}", file_name.display()))?;

    Ok(data)
}

/// Decodes a Radiance HDR equirectangular image into an [`Environment`].
pub fn decode_environment(bytes: &[u8], exposure: f32) -> anyhow::Result<Environment> {
    let hdr = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)
        .context("not a valid Radiance HDR image")?
        .to_rgb32f();
    Ok(Environment::new(tonemap_hdr(&hdr, exposure)))
}

/// Loads the optional environment map.
///
/// The environment only decorates the scene, so any failure is logged and
/// reported as `None`; the caller renders without background and
/// reflections.
pub async fn load_environment_map(path: &Path) -> Option<Environment> {
    let loaded = async {
        let bytes = load_binary(path).await?;
        decode_environment(&bytes, 1.0)
    }
    .await;
    match loaded {
        Ok(environment) => {
            log::info!(
                "Loaded environment map {} ({}x{})",
                path.display(),
                environment.image.width(),
                environment.image.height()
            );
            Some(environment)
        }
        Err(e) => {
            log::warn!(
                "Environment map {} unavailable, continuing without background: {:#}",
                path.display(),
                e
            );
            None
        }
    }
}
