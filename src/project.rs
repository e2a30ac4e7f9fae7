//! Flatten the coverage tree into the list of views a renderer draws.
//!
//! Views come out in pre-order starting at the display root, one per node.
//! Breadcrumbs are threaded down through the recursion instead of being
//! stored on the tree.

use serde::Serialize;
use tracing::debug;

use crate::annotate::{annotate, LineAnnotation};
use crate::classify::Classification;
use crate::config::Cutlines;
use crate::error::Result;
use crate::model::Counts;
use crate::source::SourceReader;
use crate::tree::{CoverageTree, Directory, Node, SourceFile};

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: String,
    pub title: String,
}

/// A row in a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub counts: Counts,
    pub percentage: f64,
    /// `None` for nodes without statements.
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
    pub annotation: LineAnnotation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewBody {
    Directory { items: Vec<ListItem> },
    File { lines: Vec<SourceLine> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub id: String,
    /// Ancestors from the display root down to and including this node.
    pub links: Vec<Link>,
    pub counts: Counts,
    pub percentage: f64,
    pub body: ViewBody,
}

impl View {
    pub fn title(&self) -> &str {
        self.links.last().map(|l| l.title.as_str()).unwrap_or_default()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.body, ViewBody::Directory { .. })
    }
}

/// Everything the rendering layer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Id of the view shown when the report opens.
    pub initial_id: String,
    pub cutlines: Cutlines,
    pub views: Vec<View>,
}

impl Report {
    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }
}

/// Project the tree starting at its display root.
pub fn project(tree: &CoverageTree, cutlines: &Cutlines, reader: &dyn SourceReader) -> Result<Report> {
    project_from(tree.display_root(), cutlines, reader)
}

/// Project the subtree rooted at `start`.
pub fn project_from(
    start: &Directory,
    cutlines: &Cutlines,
    reader: &dyn SourceReader,
) -> Result<Report> {
    let title = if start.is_root() {
        start.name.clone()
    } else {
        start.relative_path.clone()
    };

    let mut projector = Projector {
        cutlines,
        reader,
        views: Vec::new(),
    };
    projector.add_dir(start, title, &[])?;

    Ok(Report {
        initial_id: start.id.clone(),
        cutlines: *cutlines,
        views: projector.views,
    })
}

struct Projector<'a> {
    cutlines: &'a Cutlines,
    reader: &'a dyn SourceReader,
    views: Vec<View>,
}

impl Projector<'_> {
    fn list_item(&self, node: Node<'_>) -> ListItem {
        let counts = node.counts();
        ListItem {
            id: node.id().to_string(),
            title: node.name().to_string(),
            counts,
            percentage: counts.percentage(),
            classification: self.cutlines.classify(&counts),
        }
    }

    fn add_dir(&mut self, dir: &Directory, title: String, parents: &[Link]) -> Result<()> {
        let links = breadcrumbs(parents, &dir.id, title);
        let items = dir.children().map(|child| self.list_item(child)).collect();
        self.views.push(View {
            id: dir.id.clone(),
            links: links.clone(),
            counts: dir.counts,
            percentage: dir.counts.percentage(),
            body: ViewBody::Directory { items },
        });

        for sub in &dir.dirs {
            self.add_dir(sub, sub.name.clone(), &links)?;
        }
        for file in &dir.files {
            self.add_file(file, &links)?;
        }
        Ok(())
    }

    fn add_file(&mut self, file: &SourceFile, parents: &[Link]) -> Result<()> {
        let text = self.reader.read(file)?;
        let source: Vec<&str> = text.lines().collect();
        let annotations = annotate(source.len(), &file.blocks);
        debug!(path = %file.relative_path, lines = source.len(), "annotated file");

        let lines = source
            .into_iter()
            .zip(annotations)
            .enumerate()
            .map(|(idx, (text, annotation))| SourceLine {
                number: idx + 1,
                text: text.to_string(),
                annotation,
            })
            .collect();

        self.views.push(View {
            id: file.id.clone(),
            links: breadcrumbs(parents, &file.id, file.name.clone()),
            counts: file.counts,
            percentage: file.counts.percentage(),
            body: ViewBody::File { lines },
        });
        Ok(())
    }
}

fn breadcrumbs(parents: &[Link], id: &str, title: String) -> Vec<Link> {
    let mut links = parents.to_vec();
    links.push(Link {
        id: id.to_string(),
        title,
    });
    links
}
