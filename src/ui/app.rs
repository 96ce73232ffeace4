use crate::config::ExportConfig;
use crate::export::{export_elements, ExportSummary, ProgressSink};
use crate::extract::{PropertyExtractor, FIXED_COLUMNS};
use crate::model::project::matches_pattern;
use crate::model::{Element, Model};
use crate::upload::upload_export;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::collections::BTreeSet;

/// Position of an element in the model: root index, then child indexes.
pub type NodePath = Vec<usize>;

/// One line of the expanded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleNode {
    pub path: NodePath,
    pub depth: usize,
    pub label: String,
    pub class_name: String,
    pub has_children: bool,
    pub expanded: bool,
    pub marked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Export,
}

/// Progress of a running export, shown as a gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub status: String,
}

pub struct App {
    pub model: Model,
    pub config: ExportConfig,
    pub expanded: BTreeSet<NodePath>,
    /// Nodes picked as export roots. Empty means the whole model.
    pub marked: BTreeSet<NodePath>,
    pub cursor: usize,
    pub status: String,
    pub last_export: Option<ExportSummary>,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(model: Model, config: ExportConfig) -> Self {
        let status = format!(
            "{} elements loaded. Space marks export roots, e exports.",
            model.total_elements()
        );
        Self {
            model,
            config,
            expanded: BTreeSet::new(),
            marked: BTreeSet::new(),
            cursor: 0,
            status,
            last_export: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if self.handle_events()? == Action::Export {
                self.export(&mut terminal);
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        super::dashboard::draw_browser(frame, self);
    }

    fn handle_events(&mut self) -> Result<Action> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(self.handle_key(key.code));
            }
        }
        Ok(Action::None)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.visible_nodes().len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => self.expand(),
            KeyCode::Left | KeyCode::Char('h') => self.collapse(),
            KeyCode::Char(' ') => self.toggle_mark(),
            KeyCode::Char('c') => {
                self.marked.clear();
                self.status = "Selection cleared, the whole model will be exported.".to_string();
            }
            KeyCode::Char('e') => return Action::Export,
            _ => {}
        }
        Action::None
    }

    /// Tree lines in display order: pre-order over expanded nodes only.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<VisibleNode> {
        let mut nodes = Vec::new();
        let mut stack: Vec<(NodePath, &Element)> = self
            .model
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, e)| (vec![i], e))
            .collect();

        while let Some((path, element)) = stack.pop() {
            let expanded = self.expanded.contains(&path);
            if expanded {
                for (i, child) in element.children.iter().enumerate().rev() {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    stack.push((child_path, child));
                }
            }
            nodes.push(VisibleNode {
                depth: path.len() - 1,
                label: element.name.clone().unwrap_or_else(|| "Unknown".to_string()),
                class_name: element.class_name.clone().unwrap_or_default(),
                has_children: !element.children.is_empty(),
                expanded,
                marked: self.marked.contains(&path),
                path,
            });
        }
        nodes
    }

    #[must_use]
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.model.roots.get(*first)?, |node, i| node.children.get(*i))
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<(NodePath, &Element)> {
        let node = self.visible_nodes().into_iter().nth(self.cursor)?;
        let element = self.element_at(&node.path)?;
        Some((node.path, element))
    }

    /// Extracted row of the highlighted element: fixed columns first, then
    /// the remaining columns in ordinal order.
    #[must_use]
    pub fn highlighted_row(&self) -> Vec<(String, String)> {
        let Some((_, element)) = self.highlighted() else {
            return Vec::new();
        };
        let row = PropertyExtractor::new().extract(element);

        let mut entries: Vec<(String, String)> = FIXED_COLUMNS
            .iter()
            .filter_map(|column| row.get(*column).map(|v| ((*column).to_string(), v.to_string())))
            .collect();
        let mut dynamic: Vec<(String, String)> = row
            .iter()
            .filter(|(column, _)| !FIXED_COLUMNS.contains(&column.as_str()))
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        dynamic.sort();
        entries.extend(dynamic);
        entries
    }

    /// Export roots in tree order, or the model roots when nothing is marked.
    #[must_use]
    pub fn export_roots(&self) -> Vec<&Element> {
        if self.marked.is_empty() {
            return self.model.roots.iter().collect();
        }
        self.marked
            .iter()
            .filter_map(|path| self.element_at(path))
            .collect()
    }

    /// Marks every element matching `pattern` and expands its ancestors.
    /// Returns the number of new marks.
    pub fn mark_matching(&mut self, pattern: &str) -> usize {
        let mut found = Vec::new();
        let mut stack: Vec<(NodePath, &Element)> = self
            .model
            .roots
            .iter()
            .enumerate()
            .map(|(i, e)| (vec![i], e))
            .collect();
        while let Some((path, element)) = stack.pop() {
            if matches_pattern(element, pattern) {
                found.push(path.clone());
            }
            for (i, child) in element.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child_path, child));
            }
        }

        let mut added = 0;
        for path in found {
            for depth in 1..path.len() {
                self.expanded.insert(path[..depth].to_vec());
            }
            if self.marked.insert(path) {
                added += 1;
            }
        }
        if added == 0 {
            self.status = format!("No element matches '{pattern}'.");
        }
        added
    }

    fn expand(&mut self) {
        if let Some((path, element)) = self.highlighted() {
            if !element.children.is_empty() {
                self.expanded.insert(path);
            }
        }
    }

    fn collapse(&mut self) {
        let Some((path, _)) = self.highlighted() else {
            return;
        };
        if self.expanded.remove(&path) {
            return;
        }
        // Already collapsed: jump to the parent.
        if path.len() > 1 {
            let parent = &path[..path.len() - 1];
            if let Some(index) = self.visible_nodes().iter().position(|n| n.path == parent) {
                self.cursor = index;
            }
        }
    }

    fn toggle_mark(&mut self) {
        let Some((path, element)) = self.highlighted() else {
            return;
        };
        let label = element.name.clone().unwrap_or_else(|| "Unknown".to_string());
        if self.marked.remove(&path) {
            self.status = format!("Removed '{label}' from the export.");
        } else {
            self.marked.insert(path);
            self.status = format!("Added '{label}' to the export ({} roots).", self.marked.len());
        }
    }

    fn export(&mut self, terminal: &mut DefaultTerminal) {
        let result = {
            let mut progress = TerminalProgress { terminal };
            export_elements(self.export_roots(), &self.config, &mut progress)
        };

        match result {
            Ok(summary) => {
                self.status = format!(
                    "Exported {} elements and {} columns to {}.",
                    summary.elements,
                    summary.columns,
                    summary.path.display()
                );
                if let Some(upload) = &self.config.upload {
                    match upload_export(&summary.path, upload) {
                        Ok(receipt) => {
                            self.status.push_str(&format!(" Upload accepted ({}).", receipt.status));
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "upload failed");
                            self.status.push_str(&format!(" Upload failed: {err}"));
                        }
                    }
                }
                self.last_export = Some(summary);
            }
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                self.status = format!("Export failed: {err}");
            }
        }
    }
}

/// Redraws the progress gauge on every report.
struct TerminalProgress<'t> {
    terminal: &'t mut DefaultTerminal,
}

impl ProgressSink for TerminalProgress<'_> {
    fn report(&mut self, current: usize, total: usize, status: &str) {
        let progress = ExportProgress {
            current,
            total,
            status: status.to_string(),
        };
        if let Err(err) = self
            .terminal
            .draw(|frame| super::dashboard::draw_progress(frame, &progress))
        {
            tracing::warn!(error = %err, "failed to draw export progress");
        }
    }
}
