//! SQLite persistence for documents and pages.

use pagefuse::types::{DocumentStatus, Page, PageStatus, Prediction, Word};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, ServerError};

pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS documents (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            filename    TEXT NOT NULL,
            status      TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            pdf_bytes   BLOB NOT NULL
        );
        CREATE TABLE IF NOT EXISTS pages (
            document_id INTEGER NOT NULL,
            page_num    INTEGER NOT NULL,
            width       INTEGER NOT NULL,
            height      INTEGER NOT NULL,
            pdf_text    TEXT NOT NULL,
            ocr_text    TEXT,
            predictions TEXT NOT NULL,
            html        TEXT NOT NULL,
            status      TEXT NOT NULL,
            PRIMARY KEY (document_id, page_num)
        );",
    )?;
    Ok(conn)
}

pub fn insert_document(conn: &Connection, filename: &str, created_at: &str, pdf_bytes: &[u8]) -> Result<i64> {
    conn.execute(
        "INSERT INTO documents (filename, status, created_at, pdf_bytes) VALUES (?1, ?2, ?3, ?4)",
        params![filename, status_str(DocumentStatus::Processing), created_at, pdf_bytes],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_document_status(conn: &Connection, document_id: i64, status: DocumentStatus) -> Result<()> {
    conn.execute("UPDATE documents SET status = ?1 WHERE id = ?2", params![status_str(status), document_id])?;
    Ok(())
}

pub fn document_status(conn: &Connection, document_id: i64) -> Result<Option<DocumentStatus>> {
    let status: Option<String> = conn
        .query_row("SELECT status FROM documents WHERE id = ?1", params![document_id], |row| row.get(0))
        .optional()?;
    Ok(status.and_then(|s| parse_document_status(&s)))
}

/// Fetches the original upload bytes so `POST /documents/{id}/retry` can
/// re-enqueue a document without the caller re-uploading it.
pub fn document_bytes(conn: &Connection, document_id: i64) -> Result<Option<Vec<u8>>> {
    Ok(conn.query_row("SELECT pdf_bytes FROM documents WHERE id = ?1", params![document_id], |row| row.get(0)).optional()?)
}

pub fn update_page_status(conn: &Connection, document_id: i64, page_num: i64, status: PageStatus) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE pages SET status = ?1 WHERE document_id = ?2 AND page_num = ?3",
        params![page_status_str(status), document_id, page_num],
    )?;
    Ok(changed > 0)
}

pub fn upsert_page(conn: &Connection, page: &Page) -> Result<()> {
    let pdf_text_json = serde_json::to_string(&page.pdf_text)?;
    let ocr_text_json = page.ocr_text.as_ref().map(serde_json::to_string).transpose()?;
    let predictions_json = serde_json::to_string(&page.predictions)?;
    conn.execute(
        "INSERT INTO pages (document_id, page_num, width, height, pdf_text, ocr_text, predictions, html, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(document_id, page_num) DO UPDATE SET
           width = excluded.width, height = excluded.height, pdf_text = excluded.pdf_text,
           ocr_text = excluded.ocr_text, predictions = excluded.predictions, html = excluded.html,
           status = excluded.status",
        params![
            page.document_id,
            page.page_num,
            page.width,
            page.height,
            pdf_text_json,
            ocr_text_json,
            predictions_json,
            page.html,
            page_status_str(page.status)
        ],
    )?;
    Ok(())
}

pub fn get_page(conn: &Connection, document_id: i64, page_num: i64) -> Result<Option<Page>> {
    let row = conn
        .query_row(
            "SELECT width, height, pdf_text, ocr_text, predictions, html, status FROM pages WHERE document_id = ?1 AND page_num = ?2",
            params![document_id, page_num],
            |row| {
                let width: u32 = row.get(0)?;
                let height: u32 = row.get(1)?;
                let pdf_text_json: String = row.get(2)?;
                let ocr_text_json: Option<String> = row.get(3)?;
                let predictions_json: String = row.get(4)?;
                let html: String = row.get(5)?;
                let status: String = row.get(6)?;
                Ok((width, height, pdf_text_json, ocr_text_json, predictions_json, html, status))
            },
        )
        .optional()?;

    let Some((width, height, pdf_text_json, ocr_text_json, predictions_json, html, status)) = row else { return Ok(None) };
    let pdf_text: Vec<Word> = serde_json::from_str(&pdf_text_json)?;
    let ocr_text: Option<Vec<Word>> = ocr_text_json.map(|s| serde_json::from_str(&s)).transpose()?;
    let predictions: Vec<Prediction> = serde_json::from_str(&predictions_json)?;
    let status = parse_page_status(&status).ok_or_else(|| ServerError::BadState(format!("unknown page status {status}")))?;

    Ok(Some(Page {
        document_id,
        page_num,
        width,
        height,
        pdf_text,
        ocr_text,
        predictions,
        html,
        status,
    }))
}

fn status_str(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Processing => "PROCESSING",
        DocumentStatus::Done => "DONE",
        DocumentStatus::Failed => "FAILED",
    }
}

fn parse_document_status(raw: &str) -> Option<DocumentStatus> {
    match raw {
        "PROCESSING" => Some(DocumentStatus::Processing),
        "DONE" => Some(DocumentStatus::Done),
        "FAILED" => Some(DocumentStatus::Failed),
        _ => None,
    }
}

fn page_status_str(status: PageStatus) -> &'static str {
    match status {
        PageStatus::Prediction => "PREDICTION",
        PageStatus::Training => "TRAINING",
        PageStatus::Validation => "VALIDATION",
    }
}

fn parse_page_status(raw: &str) -> Option<PageStatus> {
    match raw {
        "PREDICTION" => Some(PageStatus::Prediction),
        "TRAINING" => Some(PageStatus::Training),
        "VALIDATION" => Some(PageStatus::Validation),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_status_round_trips() {
        let conn = open(":memory:").unwrap();
        let id = insert_document(&conn, "a.pdf", "2026-01-01T00:00:00Z", b"%PDF-1.4").unwrap();
        assert_eq!(document_status(&conn, id).unwrap(), Some(DocumentStatus::Processing));
        update_document_status(&conn, id, DocumentStatus::Done).unwrap();
        assert_eq!(document_status(&conn, id).unwrap(), Some(DocumentStatus::Done));
    }

    #[test]
    fn document_bytes_round_trips() {
        let conn = open(":memory:").unwrap();
        let id = insert_document(&conn, "a.pdf", "2026-01-01T00:00:00Z", b"%PDF-1.4").unwrap();
        assert_eq!(document_bytes(&conn, id).unwrap(), Some(b"%PDF-1.4".to_vec()));
    }

    #[test]
    fn page_status_update_reports_whether_a_row_existed() {
        let conn = open(":memory:").unwrap();
        let page = Page {
            document_id: 1,
            page_num: 0,
            width: 100,
            height: 200,
            pdf_text: vec![],
            ocr_text: None,
            predictions: vec![],
            html: "<p>hi</p>".to_string(),
            status: PageStatus::Prediction,
        };
        upsert_page(&conn, &page).unwrap();
        assert!(update_page_status(&conn, 1, 0, PageStatus::Training).unwrap());
        assert!(!update_page_status(&conn, 1, 99, PageStatus::Training).unwrap());
        assert_eq!(get_page(&conn, 1, 0).unwrap().unwrap().status, PageStatus::Training);
    }

    #[test]
    fn page_upsert_then_get_round_trips_html() {
        let conn = open(":memory:").unwrap();
        let page = Page {
            document_id: 1,
            page_num: 0,
            width: 100,
            height: 200,
            pdf_text: vec![],
            ocr_text: None,
            predictions: vec![],
            html: "<p>hi</p>".to_string(),
            status: PageStatus::Prediction,
        };
        upsert_page(&conn, &page).unwrap();
        let fetched = get_page(&conn, 1, 0).unwrap().unwrap();
        assert_eq!(fetched.html, "<p>hi</p>");
    }

    #[test]
    fn get_page_for_missing_page_returns_none() {
        let conn = open(":memory:").unwrap();
        assert!(get_page(&conn, 1, 0).unwrap().is_none());
    }

    #[test]
    fn page_upsert_then_get_round_trips_text_layers() {
        let conn = open(":memory:").unwrap();
        let word = Word { rect: pagefuse::geometry::Rect::new(0.0, 0.0, 10.0, 10.0), text: "hi".to_string() };
        let page = Page {
            document_id: 1,
            page_num: 0,
            width: 100,
            height: 200,
            pdf_text: vec![word.clone()],
            ocr_text: Some(vec![word]),
            predictions: vec![],
            html: String::new(),
            status: PageStatus::Prediction,
        };
        upsert_page(&conn, &page).unwrap();
        let fetched = get_page(&conn, 1, 0).unwrap().unwrap();
        assert_eq!(fetched.pdf_text.len(), 1);
        assert_eq!(fetched.ocr_text.unwrap().len(), 1);
    }
}
