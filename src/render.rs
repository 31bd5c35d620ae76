//! View construction for the document list, kept apart from the data
//! operations so either surface (terminal table or HTML panel) can be built
//! from the same cards.

use crate::models::{DocumentRecord, DocumentSource};
use prettytable::{Cell, Row, Table};

pub const EMPTY_TITLE: &str = "No documents added yet";
pub const EMPTY_HINT: &str = "Add your first document to see it listed here";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Pdf,
    Word,
    Excel,
    Generic,
}

impl FileIcon {
    pub fn for_locator(locator: &str) -> Self {
        let locator = locator.to_lowercase();
        if locator.contains(".pdf") {
            FileIcon::Pdf
        } else if locator.contains(".doc") {
            FileIcon::Word
        } else if locator.contains(".xls") {
            FileIcon::Excel
        } else {
            FileIcon::Generic
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FileIcon::Pdf => "fa-file-pdf",
            FileIcon::Word => "fa-file-word",
            FileIcon::Excel => "fa-file-excel",
            FileIcon::Generic => "fa-file",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileIcon::Pdf => "PDF",
            FileIcon::Word => "Word",
            FileIcon::Excel => "Excel",
            FileIcon::Generic => "File",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Edit(i64),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub badge: String,
    pub date: String,
    pub icon: FileIcon,
    /// External URL, if the record points at one.
    pub href: Option<String>,
    /// One-line summary of where the document lives.
    pub location: String,
    pub actions: [CardAction; 2],
}

impl DocumentCard {
    pub fn from_record(record: &DocumentRecord) -> Self {
        let (href, location) = match &record.source {
            DocumentSource::Link { link } => (Some(link.clone()), link.clone()),
            DocumentSource::File {
                file_name,
                file_size,
            } => (None, format!("{} ({})", file_name, human_size(*file_size))),
        };

        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            badge: record.doc_type.to_string(),
            date: record.date.clone(),
            icon: FileIcon::for_locator(record.source.locator()),
            href,
            location,
            actions: [CardAction::Edit(record.id), CardAction::Delete(record.id)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty,
    Cards(Vec<DocumentCard>),
}

impl ListView {
    pub fn build(documents: &[DocumentRecord]) -> Self {
        if documents.is_empty() {
            ListView::Empty
        } else {
            ListView::Cards(documents.iter().map(DocumentCard::from_record).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ListView::Empty => 0,
            ListView::Cards(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` for the empty view, which is shown as a placeholder instead.
    pub fn to_table(&self) -> Option<Table> {
        let ListView::Cards(cards) = self else {
            return None;
        };

        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("ID"),
            Cell::new("Title"),
            Cell::new("Type"),
            Cell::new("Date"),
            Cell::new("Kind"),
            Cell::new("Location"),
            Cell::new("Description"),
        ]));

        for card in cards {
            table.add_row(Row::new(vec![
                Cell::new(&card.id.to_string()),
                Cell::new(&card.title),
                Cell::new(&card.badge),
                Cell::new(&card.date),
                Cell::new(card.icon.label()),
                Cell::new(&card.location),
                Cell::new(&card.description),
            ]));
        }

        Some(table)
    }

    pub fn to_html(&self) -> String {
        let cards = match self {
            ListView::Empty => {
                return format!(
                    "<div class=\"empty-state\">\n  <i class=\"fas fa-folder-open\"></i>\n  <h3>{}</h3>\n  <p>{}</p>\n</div>\n",
                    EMPTY_TITLE, EMPTY_HINT
                );
            }
            ListView::Cards(cards) => cards,
        };

        let mut html = String::new();
        for card in cards {
            html.push_str(&card_html(card));
        }
        html
    }
}

fn card_html(card: &DocumentCard) -> String {
    let location = match &card.href {
        Some(href) => format!(
            "<a href=\"{}\" target=\"_blank\" class=\"doc-link\">{}</a>",
            escape_html(href),
            escape_html(&card.location)
        ),
        None => format!("<span class=\"doc-file\">{}</span>", escape_html(&card.location)),
    };

    let actions: String = card
        .actions
        .iter()
        .map(|action| match action {
            CardAction::Edit(id) => format!(
                "<button data-action=\"edit\" data-id=\"{id}\" class=\"btn-action edit\">Edit</button>"
            ),
            CardAction::Delete(id) => format!(
                "<button data-action=\"delete\" data-id=\"{id}\" class=\"btn-action delete\">Delete</button>"
            ),
        })
        .collect();

    format!(
        concat!(
            "<div class=\"document-card-admin\" data-id=\"{id}\">\n",
            "  <div class=\"doc-icon\"><i class=\"fas {icon}\"></i></div>\n",
            "  <div class=\"doc-details\">\n",
            "    <h4>{title}</h4>\n",
            "    <p class=\"doc-description\">{description}</p>\n",
            "    <div class=\"doc-meta\"><span class=\"doc-type\">{badge}</span> <span class=\"doc-date\">{date}</span></div>\n",
            "    {location}\n",
            "  </div>\n",
            "  <div class=\"doc-actions\">{actions}</div>\n",
            "</div>\n"
        ),
        id = card.id,
        icon = card.icon.css_class(),
        title = escape_html(&card.title),
        description = escape_html(&card.description),
        badge = escape_html(&card.badge),
        date = escape_html(&card.date),
        location = location,
        actions = actions,
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size >= MB {
        format!("{:.2} MB", size / MB)
    } else if size >= KB {
        format!("{:.2} KB", size / KB)
    } else {
        format!("{} B", bytes)
    }
}
