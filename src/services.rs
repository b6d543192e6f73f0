//! Browser I/O: fetching the similarity document and uploading images.

use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FileList, FormData, RequestCache, RequestInit, Response};

use crate::similarity::{Error, Result};

/// Where the pipeline publishes the similarity document.
pub const DOCUMENT_URL: &str = "/static/similarity.json";

/// Image upload endpoint.
pub const UPLOAD_URL: &str = "/upload";

/// Body returned by the upload endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadResponse {
	/// Whether the server accepted the files.
	pub success: bool,
	/// Stored file names.
	#[serde(default)]
	pub saved: Vec<String>,
}

fn describe(err: JsValue) -> String {
	err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

async fn send(url: &str, init: &RequestInit) -> std::result::Result<Response, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let resp = JsFuture::from(window.fetch_with_str_and_init(url, init)).await?;
	resp.dyn_into::<Response>()
}

async fn body_text(resp: &Response) -> std::result::Result<String, JsValue> {
	let text = JsFuture::from(resp.text()?).await?;
	Ok(text.as_string().unwrap_or_default())
}

/// Fetch the similarity document as text, bypassing the browser cache.
pub async fn fetch_document(url: &str) -> Result<String> {
	let init = RequestInit::new();
	init.set_method("GET");
	init.set_cache(RequestCache::NoStore);

	let resp = send(url, &init)
		.await
		.map_err(|e| Error::Fetch(describe(e)))?;
	if !resp.ok() {
		return Err(Error::Fetch(format!("{url} returned {}", resp.status())));
	}
	body_text(&resp)
		.await
		.map_err(|e| Error::Fetch(describe(e)))
}

/// Post every file as a `files` form field.
pub async fn upload_images(files: &FileList) -> Result<UploadResponse> {
	let form = FormData::new().map_err(|e| Error::Upload(describe(e)))?;
	for file in (0..files.length()).filter_map(|i| files.get(i)) {
		form.append_with_blob_and_filename("files", &file, &file.name())
			.map_err(|e| Error::Upload(describe(e)))?;
	}

	let init = RequestInit::new();
	init.set_method("POST");
	init.set_body(&form);

	let resp = send(UPLOAD_URL, &init)
		.await
		.map_err(|e| Error::Upload(describe(e)))?;
	if !resp.ok() {
		return Err(Error::Upload(format!("server returned {}", resp.status())));
	}
	let body = body_text(&resp)
		.await
		.map_err(|e| Error::Upload(describe(e)))?;
	serde_json::from_str(&body).map_err(|e| Error::Upload(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn upload_response_tolerates_missing_saved() {
		let resp: UploadResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
		assert!(resp.success);
		assert!(resp.saved.is_empty());

		let resp: UploadResponse =
			serde_json::from_str(r#"{"success": true, "saved": ["a.jpg", "b.png"]}"#).unwrap();
		assert_eq!(resp.saved, vec!["a.jpg", "b.png"]);
	}
}
