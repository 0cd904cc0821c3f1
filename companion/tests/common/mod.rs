#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use companion::Intent;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use lingproc::{ChatMessage, SamplingOptions, ScoredLabel, TextScorer, VisionChatter, ZeroShotClassifier};

/// Scorer returning the same scores for every text.
pub struct FixedScorer(pub Vec<f32>);

#[async_trait]
impl TextScorer for FixedScorer {
    async fn score(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

/// Scorer that always errors.
pub struct FailingScorer;

#[async_trait]
impl TextScorer for FailingScorer {
    async fn score(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow::anyhow!("scorer exploded"))
    }
}

/// Zero-shot classifier that always ranks its intent first.
pub struct FixedIntent(pub Intent);

#[async_trait]
impl ZeroShotClassifier for FixedIntent {
    async fn rank(&self, _text: &str, candidates: &[&str]) -> anyhow::Result<Vec<ScoredLabel>> {
        let mut ranked: Vec<ScoredLabel> = candidates
            .iter()
            .map(|c| ScoredLabel {
                label: c.to_string(),
                score: 0.0,
            })
            .collect();
        if let Some(pos) = ranked.iter().position(|r| r.label == self.0.as_str()) {
            let mut top = ranked.remove(pos);
            top.score = 1.0;
            ranked.insert(0, top);
        }
        Ok(ranked)
    }
}

/// Zero-shot classifier returning whatever labels it was built with.
pub struct RawRanking(pub Vec<&'static str>);

#[async_trait]
impl ZeroShotClassifier for RawRanking {
    async fn rank(&self, _text: &str, _candidates: &[&str]) -> anyhow::Result<Vec<ScoredLabel>> {
        Ok(self
            .0
            .iter()
            .map(|l| ScoredLabel {
                label: l.to_string(),
                score: 0.5,
            })
            .collect())
    }
}

/// Zero-shot classifier that always errors.
pub struct FailingIntent;

#[async_trait]
impl ZeroShotClassifier for FailingIntent {
    async fn rank(&self, _text: &str, _candidates: &[&str]) -> anyhow::Result<Vec<ScoredLabel>> {
        Err(anyhow::anyhow!("nli model unreachable"))
    }
}

/// Chatter replying with a fixed text and recording every call.
#[derive(Default)]
pub struct RecordingChatter {
    pub reply: String,
    pub calls: Mutex<Vec<(Vec<ChatMessage>, SamplingOptions)>>,
}

impl RecordingChatter {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<ChatMessage>, SamplingOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionChatter for RecordingChatter {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &SamplingOptions,
    ) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), *options));
        Ok(self.reply.clone())
    }
}

/// Chatter that never answers in time.
pub struct StalledChatter(pub Duration);

#[async_trait]
impl VisionChatter for StalledChatter {
    async fn generate(&self, _: &[ChatMessage], _: &SamplingOptions) -> anyhow::Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".into())
    }
}

/// Chatter whose backend is broken.
pub struct BrokenChatter;

#[async_trait]
impl VisionChatter for BrokenChatter {
    async fn generate(&self, _: &[ChatMessage], _: &SamplingOptions) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

fn encode(img: DynamicImage, format: ImageOutputFormat) -> String {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    BASE64.encode(buf.into_inner())
}

/// Base64 PNG of a small solid image.
pub fn png_base64(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 180, 60]));
    encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Png)
}

/// Base64 JPEG of a small solid image.
pub fn jpeg_base64(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 220]));
    encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Jpeg(85))
}
