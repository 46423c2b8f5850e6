//! AI coach comments from the Gemini text-generation API.

use crate::config::CoachConfig;
use crate::models::{DailyLog, WeeklyGoal};
use crate::stats::log_totals;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

pub const MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(50);

#[derive(Debug)]
pub enum CoachError {
    MissingApiKey,
    Transport(reqwest::Error),
    Status(StatusCode, String),
    Malformed(String),
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoachError::MissingApiKey => write!(f, "GEMINI_API_KEY is not set"),
            CoachError::Transport(err) => write!(f, "{err}"),
            CoachError::Status(status, body) => {
                write!(f, "Gemini API {}: {body}", status.as_u16())
            }
            CoachError::Malformed(reason) => write!(f, "unexpected response: {reason}"),
        }
    }
}

impl std::error::Error for CoachError {}

impl From<reqwest::Error> for CoachError {
    fn from(err: reqwest::Error) -> Self {
        CoachError::Transport(err)
    }
}

#[derive(Clone)]
pub struct CoachClient {
    http: Client,
    config: CoachConfig,
}

impl CoachClient {
    pub fn new(config: CoachConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    /// Asks the coach about one day. Failures come back as a readable
    /// message instead of an error, so the result can always be shown.
    pub async fn comment(&self, log: &DailyLog, goal: &WeeklyGoal) -> String {
        match self.generate(&build_prompt(log, goal)).await {
            Ok(text) => {
                info!(date = %log.date, "coach comment generated");
                text
            }
            Err(err) => {
                error!(date = %log.date, "failed to generate coach comment: {err}");
                format!("コメントの生成に失敗しました: {err}")
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, CoachError> {
        let api_key = self.config.api_key.as_deref().ok_or(CoachError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{MODEL}:generateContent",
            self.config.api_base.trim_end_matches('/')
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CoachError::Status(status, body));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|err| CoachError::Malformed(err.to_string()))?;
        // An answer without text leaves the comment empty.
        Ok(extract_text(&value))
    }
}

fn extract_text(value: &Value) -> String {
    value["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn build_prompt(log: &DailyLog, goal: &WeeklyGoal) -> String {
    let totals = log_totals(log);
    let tasks = if log.tasks.is_empty() {
        "なし".to_string()
    } else {
        log.tasks
            .iter()
            .map(|task| {
                format!(
                    "- {}: 計画{}分, 実績{}分",
                    task.content, task.planned_minutes, task.actual_minutes
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "あなたは支援的で励みになる学習コーチです。あなたの目標は、ユーザーが学習を続けるように動機付けることです。
以下の今日の学習ログを分析し、短く、肯定的で、建設的なコメントを日本語で提供してください。

## 状況
- 今週の目標: {title}
- 今日の目標 (ベスト): {best}分
- 今日の目標 (ミニマム): {min}分
- 今日の総計画学習時間: {planned}分
- 今日の総実績学習時間: {actual}分
- ユーザーのコメント: \"{comment}\"
- 取り組んだタスク:
{tasks}

## 指示
- 計画と実績を比較し、計画通りまたはそれ以上にできた場合は特に褒めてください。
- 総実績学習時間がミニマム目標を達成した場合、その努力を褒めてください。
- ベスト目標を達成した場合は、非常に熱心に祝福してください。
- ミニマム目標に届かなかった場合は、優しく励まし、明日のための小さなステップを提案してください。
- ユーザーのコメントや具体的なタスク内容にも触れて、パーソナライズされたフィードバックを心がけてください。
- 全体的に、フレンドリーでやる気の出るトーンを保ってください。
- 応答はコーチからのコメントのみとし、前置きは不要です。
",
        title = goal.title,
        best = log.best_goal,
        min = log.min_goal,
        planned = totals.planned_minutes,
        actual = totals.actual_minutes,
        comment = log.comment,
    )
}
