//! Catalog builders shared by integration tests.

use emote_downloader::{Emote, EmoteSet, ImageFormat, ImageSize};
use serde_json::{Value, json};

/// Builds a set whose emotes publish `format`/`size` under `<base>/emote/<id>/`.
pub fn emote_set(base: &str, name: &str, emote_names: &[&str], format: ImageFormat, size: &str) -> EmoteSet {
    let size: ImageSize = size.parse().expect("valid size tag");
    let emotes = emote_names
        .iter()
        .enumerate()
        .map(|(index, emote_name)| {
            let id = format!("{name}-{index}");
            let url = format!("{base}/emote/{id}/{size}.{}", format.extension());
            Emote::new(id, *emote_name).with_url(format, size.clone(), url)
        })
        .collect();

    EmoteSet {
        id: format!("{name}-id"),
        name: name.to_string(),
        capacity: 600,
        emotes,
    }
}

/// Path the CDN serves for emote `index` of set `name`.
pub fn emote_path(name: &str, index: usize, format: ImageFormat, size: &str) -> String {
    format!("/emote/{name}-{index}/{size}.{}", format.extension())
}

/// `GET /users/<id>` response body.
pub fn user_json(username: &str, set_ids: &[&str]) -> Value {
    json!({
        "id": "user-1",
        "username": username,
        "display_name": username,
        "emote_sets": set_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
    })
}

/// `GET /emote-sets/<id>` response body; every emote publishes `1x.webp` and `2x.gif`.
pub fn emote_set_json(id: &str, name: &str, cdn_base: &str, emotes: &[(&str, &str)]) -> Value {
    json!({
        "id": id,
        "name": name,
        "capacity": 600,
        "emotes": emotes
            .iter()
            .map(|(emote_id, emote_name)| json!({
                "id": emote_id,
                "name": emote_name,
                "data": {
                    "id": emote_id,
                    "name": emote_name,
                    "host": {
                        "url": format!("{cdn_base}/emote/{emote_id}"),
                        "files": [
                            {"name": "1x.webp", "format": "WEBP"},
                            {"name": "2x.gif", "format": "GIF"}
                        ]
                    }
                }
            }))
            .collect::<Vec<_>>(),
    })
}
