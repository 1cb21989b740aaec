use axum::http::StatusCode;
use chrono::{DateTime, Local, Utc};
use humansize::{format_size, BINARY};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::{listing::DirectoryEntry, resolve};

/// Shared page chrome.
fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="/public/style.css";
                script src="/public/app.js" defer {}
            }
            body {
                header {
                    a href="/" class="brand" { "File Sharing Network" }
                    nav {
                        a href="/qrcode" { "QR Code" }
                        a href="/active-users" { "Active Users" }
                    }
                }
                main { (body) }
            }
        }
    }
}

/// Directory page: breadcrumb, entries and the upload form.
pub fn directory_page(current: &str, entries: &[DirectoryEntry]) -> Markup {
    let mut dirs: Vec<&DirectoryEntry> = entries.iter().filter(|e| e.is_dir).collect();
    let mut files: Vec<&DirectoryEntry> = entries.iter().filter(|e| !e.is_dir).collect();
    dirs.sort_by_key(|e| e.name.to_lowercase());
    files.sort_by_key(|e| e.name.to_lowercase());

    layout(
        "File Sharing Network",
        html! {
            (breadcrumb(current))

            table #file-list {
                thead {
                    tr { th { "Name" } th { "Size" } th { "Modified" } th {} }
                }
                tbody {
                    @if let Some(parent) = resolve::logical_parent(current) {
                        tr {
                            td colspan="4" {
                                a href=(href(&parent)) {
                                    span class="icon" { "⬆️" } " .."
                                }
                            }
                        }
                    }
                    @for dir in &dirs {
                        tr {
                            td {
                                a href=(href(&dir.path)) {
                                    span class="icon" { "📁" } " " (dir.name)
                                }
                            }
                            td { "—" }
                            td { (modified(dir.modified)) }
                            td {}
                        }
                    }
                    @for file in &files {
                        tr {
                            td {
                                a href={ "/files" (href(&file.path)) } {
                                    span class="icon" { (icon_for(&file.name)) } " " (file.name)
                                }
                            }
                            td { (file.size.map(|s| format_size(s, BINARY)).unwrap_or_default()) }
                            td { (modified(file.modified)) }
                            td {
                                a class="download"
                                  href={ "/download/" (urlencoding::encode(&file.name).into_owned()) "?path=" (urlencoding::encode(current).into_owned()) } {
                                    "Download"
                                }
                            }
                        }
                    }
                    @if entries.is_empty() {
                        tr { td colspan="4" class="empty" { "This folder is empty." } }
                    }
                }
            }

            form #upload-form action="/upload" method="post" enctype="multipart/form-data" {
                input type="hidden" name="currentPath" value=(current);
                label for="file-input" class="drop-zone" { "Drop a file here or click to choose" }
                input #file-input type="file" name="file" required;
                progress #upload-progress value="0" max="100" hidden {}
                button type="submit" { "Upload" }
                div #upload-message role="status" {}
            }
        },
    )
}

/// Connect page with a scannable LAN URL.
pub fn qrcode_page(url: &str, ip: &str, port: u16, svg: Option<&str>) -> Markup {
    layout(
        "QR Code",
        html! {
            section class="qrcode" {
                h1 { "Scan to connect" }
                @match svg {
                    Some(svg) => div class="qr-image" { (PreEscaped(svg)) },
                    None => p class="error" { "Unable to generate QR code." },
                }
                p { a href=(url) { (url) } }
                dl {
                    dt { "IP address" } dd { (ip) }
                    dt { "Port" } dd { (port) }
                }
            }
        },
    )
}

pub fn active_users_page(users: &[String]) -> Markup {
    layout(
        "Active Users",
        html! {
            h1 { "Active Users (" (users.len()) ")" }
            ul class="users" {
                @for user in users {
                    li { (user) }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    layout(
        status.canonical_reason().unwrap_or("Error"),
        html! {
            div class="error" {
                h2 { (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error")) }
                p { (message) }
                p { a href="/" { "Back to the shared folder" } }
            }
        },
    )
}

fn breadcrumb(current: &str) -> Markup {
    let segments: Vec<&str> = current.split('/').filter(|s| !s.is_empty()).collect();
    html! {
        nav #current-path {
            a href="/" { "Home" }
            @for (i, segment) in segments.iter().enumerate() {
                " / "
                a href=(href(&format!("/{}", segments[..=i].join("/")))) { (segment) }
            }
        }
    }
}

/// Percent-encodes each segment of a logical path.
pub fn href(logical: &str) -> String {
    let encoded: Vec<String> = logical
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

fn modified(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| {
        let local: DateTime<Local> = at.into();
        local.format("%Y-%m-%d %H:%M").to_string()
    })
    .unwrap_or_default()
}

/// Display glyph for a file name, by extension.
pub fn icon_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "📕",
        "doc" | "docx" | "odt" | "rtf" => "📝",
        "xls" | "xlsx" | "ods" | "csv" => "📊",
        "ppt" | "pptx" | "odp" => "📑",
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" => "🖼️",
        "mp3" | "wav" | "flac" | "ogg" | "m4a" => "🎵",
        "mp4" | "avi" | "mov" | "mkv" | "webm" => "🎬",
        "zip" | "rar" | "7z" | "tar" | "gz" => "🗄️",
        "html" | "htm" | "css" | "js" => "🌐",
        "exe" | "msi" | "dmg" | "apk" => "📦",
        _ => "📄",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            path: format!("/docs/{}", name),
            is_dir,
            size: (!is_dir).then_some(2048),
            modified: None,
        }
    }

    #[test]
    fn href_encodes_segments_not_slashes() {
        assert_eq!(href("/"), "/");
        assert_eq!(href("/my docs/a&b.txt"), "/my%20docs/a%26b.txt");
    }

    #[test]
    fn icons_by_extension() {
        assert_eq!(icon_for("Report.PDF"), "📕");
        assert_eq!(icon_for("song.flac"), "🎵");
        assert_eq!(icon_for("Makefile"), "📄");
    }

    #[test]
    fn directory_page_lists_dirs_before_files() {
        let entries = vec![entry("b.txt", false), entry("Zeta", true), entry("a.txt", false)];
        let page = directory_page("/docs", &entries).into_string();

        let zeta = page.find("Zeta").unwrap();
        let a = page.find("a.txt").unwrap();
        let b = page.find("b.txt").unwrap();
        assert!(zeta < a && a < b);
        assert!(page.contains("2 KiB"));
        assert!(page.contains("href=\"/files/docs/a.txt\""));
        assert!(page.contains("/download/a.txt?path=%2Fdocs"));
        assert!(page.contains("name=\"currentPath\" value=\"/docs\""));
        // Parent link back to the root.
        assert!(page.contains("href=\"/\""));
    }

    #[test]
    fn names_are_escaped() {
        let entries = vec![entry("<script>.txt", false)];
        let page = directory_page("/", &entries).into_string();
        assert!(!page.contains("<script>.txt"));
        assert!(page.contains("&lt;script&gt;.txt"));
    }
}
