use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};
use serde::Deserialize;

use crate::services::viewer::{self, Entry, ViewerError};

#[derive(Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub data: String,
}

#[derive(Deserialize)]
pub struct UnlockForm {
    pub data: String,
    pub password: String,
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>QRCode Secure</title></head>
<body style="background-color:#F0F8FF;padding:40px 0;font-family:Arial,sans-serif;">
    <div style="max-width:480px;margin:0 auto;background:#fff;padding:32px;border-radius:8px;">
        <h1 style="color:#0A4D68;text-align:center">QRCode Secure</h1>
        {}
    </div>
</body>
</html>"#,
        body
    )
}

fn prompt(data: &str, notice: Option<&str>) -> String {
    let notice = notice
        .map(|n| format!(r#"<p style="color:#b91c1c">{}</p>"#, escape(n)))
        .unwrap_or_default();

    page(&format!(
        r#"<p style="color:#333">Enter the password to view the details in this code.</p>
        {}
        <form method="post" action="/view/unlock">
            <input type="hidden" name="data" value="{}">
            <input type="password" name="password" placeholder="Password" required style="width:100%;padding:8px;margin:12px 0">
            <button type="submit" style="width:100%;padding:10px;background:#0A4D68;color:#fff;border:0;border-radius:4px">View Details</button>
        </form>"#,
        notice,
        escape(data)
    ))
}

fn details(entries: &[Entry]) -> String {
    let rows: String = entries
        .iter()
        .map(|e| {
            format!(
                r#"<tr><th style="text-align:left;padding:6px;color:#0A4D68">{}</th><td style="padding:6px">{}</td></tr>"#,
                escape(&e.label),
                escape(&e.value)
            )
        })
        .collect();

    page(&format!(r#"<table style="width:100%;border-collapse:collapse">{}</table>"#, rows))
}

#[get("/view")]
pub async fn view(query: web::Query<ViewQuery>) -> impl Responder {
    if query.data.trim().is_empty() {
        return HttpResponse::BadRequest()
            .content_type("text/html; charset=utf-8")
            .body(page("<p>This link carries no data.</p>"));
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(prompt(&query.data, None))
}

#[post("/view/unlock")]
pub async fn unlock(form: web::Form<UnlockForm>) -> impl Responder {
    match viewer::unlock(&form.data, &form.password) {
        Ok(entries) => {
            info!("Payload unlocked ({} entries)", entries.len());
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(details(&entries))
        }
        Err(ViewerError::WrongPassword) => {
            warn!("Wrong password for payload");
            HttpResponse::Unauthorized()
                .content_type("text/html; charset=utf-8")
                .body(prompt(&form.data, Some("Incorrect password.")))
        }
        Err(e) => {
            warn!("Could not open payload: {}", e);
            HttpResponse::BadRequest()
                .content_type("text/html; charset=utf-8")
                .body(page(&format!("<p>{}</p>", escape(&e.to_string()))))
        }
    }
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(view);
    cfg.service(unlock);
}
