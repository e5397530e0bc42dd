//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use image_processor::config::ServiceConfig;
use image_processor::http::{HttpServer, ServerError};
use image_processor::lifecycle::Shutdown;
use image_processor::transform::Transform;
use reqwest::multipart::{Form, Part};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to finish draining.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// Config bound to loopback with a small ceiling.
pub fn local_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upload.max_bytes = 1024 * 1024;
    config
}

pub async fn spawn_server(config: ServiceConfig) -> TestServer {
    spawn(HttpServer::new(config)).await
}

pub async fn spawn_with_transform(config: ServiceConfig, transform: Arc<dyn Transform>) -> TestServer {
    spawn(HttpServer::with_transform(config, transform)).await
}

async fn spawn(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let stop = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, &stop).await });

    wait_until_ready(addr).await;
    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Poll `/health` until the server answers.
async fn wait_until_ready(addr: SocketAddr) {
    let client = reqwest::Client::new();
    let url = format!("http://{}/health", addr);
    for _ in 0..50 {
        if let Ok(res) = client.get(&url).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("server at {} never became ready", addr);
}

/// JPEG whose top half is white and bottom half black.
pub fn two_tone_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 95))
        .unwrap();
    out.into_inner()
}

/// Single-file multipart form. Filenames are sent unencoded.
pub fn upload_form(field: &str, filename: &str, bytes: Vec<u8>) -> Form {
    Form::new()
        .percent_encode_noop()
        .part(field.to_string(), Part::bytes(bytes).file_name(filename.to_string()))
}

/// Mean luma of the top and bottom rows.
pub fn edge_row_luma(bytes: &[u8]) -> (u8, u8) {
    let img = image::load_from_memory(bytes).unwrap().to_luma8();
    let mean = |y: u32| {
        let sum: u32 = (0..img.width()).map(|x| img.get_pixel(x, y).0[0] as u32).sum();
        (sum / img.width()) as u8
    };
    (mean(0), mean(img.height() - 1))
}
