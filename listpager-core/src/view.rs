//! Render model for a pagination widget.
//!
//! The view never touches the state directly: it turns a [`PageSnapshot`]
//! into a [`RenderedPage`], and user interactions come back as
//! [`ViewAction`]s for the paginator to dispatch.

use crate::config::PagerOptions;
use crate::pagination::{item_range, page_window};
use crate::state::PageSnapshot;
use std::fmt;

/// User interactions a rendered widget can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    GoToPage(u32),
    Previous,
    Next,
    ChangePageSize(u32),
    /// Free text typed into the "go to page" box
    GoToInput(String),
}

/// Renders the rows of the current page. The host supplies this.
pub trait DisplayComponent<T>: Send + Sync {
    fn display(&self, items: &[T], item_id: &dyn Fn(&T) -> String) -> String;
}

impl<T, F> DisplayComponent<T> for F
where
    F: Fn(&[T], &dyn Fn(&T) -> String) -> String + Send + Sync,
{
    fn display(&self, items: &[T], item_id: &dyn Fn(&T) -> String) -> String {
        self(items, item_id)
    }
}

/// One line per item: `[id] item`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDisplay;

impl<T: fmt::Display> DisplayComponent<T> for ListDisplay {
    fn display(&self, items: &[T], item_id: &dyn Fn(&T) -> String) -> String {
        items
            .iter()
            .map(|item| format!("[{}] {}", item_id(item), item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub active: bool,
    /// Spinner on the active link while a fetch is in flight
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControl {
    pub target: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} entries",
            self.first, self.last, self.total
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSelector {
    pub options: Vec<u32>,
    pub selected: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub container_id: Option<String>,
    pub body: String,
    pub previous: NavControl,
    pub page_links: Vec<PageLink>,
    pub next: NavControl,
    pub summary: Option<Summary>,
    pub size_selector: Option<SizeSelector>,
}

impl RenderedPage {
    /// Translate a clicked page link into an action
    pub fn action_for_link(&self, number: u32) -> Option<ViewAction> {
        self.page_links
            .iter()
            .find(|link| link.number == number && !link.active)
            .map(|link| ViewAction::GoToPage(link.number))
    }
}

impl fmt::Display for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.container_id {
            writeln!(f, "#{}", id)?;
        }
        if !self.body.is_empty() {
            writeln!(f, "{}", self.body)?;
        }

        let prev = if self.previous.enabled { "<" } else { " " };
        let next = if self.next.enabled { ">" } else { " " };
        let links: Vec<String> = self
            .page_links
            .iter()
            .map(|link| match (link.active, link.loading) {
                (true, true) => format!("[{}…]", link.number),
                (true, false) => format!("[{}]", link.number),
                _ => link.number.to_string(),
            })
            .collect();
        write!(f, "{} {} {}", prev, links.join(" "), next)?;

        if let Some(summary) = &self.summary {
            write!(f, "\n{}", summary)?;
        }
        if let Some(selector) = &self.size_selector {
            let options: Vec<String> = selector
                .options
                .iter()
                .map(|size| {
                    if *size == selector.selected {
                        format!("*{}", size)
                    } else {
                        size.to_string()
                    }
                })
                .collect();
            write!(f, "\nPer page: {}", options.join(" "))?;
        }
        Ok(())
    }
}

pub struct PaginationView<T> {
    options: PagerOptions,
    display: Box<dyn DisplayComponent<T>>,
    item_id: Box<dyn Fn(&T) -> String + Send + Sync>,
}

impl<T> PaginationView<T> {
    pub fn new(
        options: PagerOptions,
        display: impl DisplayComponent<T> + 'static,
        item_id: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            options,
            display: Box::new(display),
            item_id: Box::new(item_id),
        }
    }

    pub fn render(&self, snapshot: &PageSnapshot<T>) -> RenderedPage {
        let current = snapshot.current_page;
        let max_page = snapshot.max_page;

        let page_links = page_window(current, max_page, self.options.max_pages_shown)
            .map(|number| PageLink {
                number,
                active: number == current,
                loading: number == current && snapshot.is_loading,
            })
            .collect();

        let (summary, size_selector) = if self.options.inline_page_list_only {
            (None, None)
        } else {
            (
                Some(summarize(snapshot)),
                Some(SizeSelector {
                    options: self.options.allowed_page_sizes.clone(),
                    selected: snapshot.page_size,
                }),
            )
        };

        RenderedPage {
            container_id: self.options.id.clone(),
            body: self.display.display(&snapshot.items, self.item_id.as_ref()),
            previous: NavControl {
                target: current.saturating_sub(1).max(1),
                enabled: current > 1,
            },
            page_links,
            next: NavControl {
                target: current.saturating_add(1).min(max_page),
                enabled: current < max_page,
            },
            summary,
            size_selector,
        }
    }
}

fn summarize<T>(snapshot: &PageSnapshot<T>) -> Summary {
    let range = item_range(
        snapshot.current_page,
        snapshot.page_size,
        snapshot.total_item_count,
    );
    if range.is_empty() {
        Summary {
            first: 0,
            last: 0,
            total: snapshot.total_item_count,
        }
    } else {
        Summary {
            first: range.start as u64 + 1,
            last: range.end as u64,
            total: snapshot.total_item_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current_page: u32, page_size: u32, total: u64, is_loading: bool) -> PageSnapshot<u32> {
        let range = item_range(current_page, page_size, total);
        PageSnapshot {
            current_page,
            page_size,
            items: (range.start as u32 + 1..=range.end as u32).collect(),
            total_item_count: total,
            is_loading,
            max_page: crate::pagination::page_count(total, page_size),
        }
    }

    fn view(options: PagerOptions) -> PaginationView<u32> {
        PaginationView::new(options, ListDisplay, |n: &u32| format!("row-{}", n))
    }

    #[test]
    fn test_render_middle_page() {
        let rendered = view(PagerOptions::default()).render(&snapshot(3, 5, 23, false));

        assert_eq!(rendered.body.lines().count(), 5);
        assert!(rendered.body.starts_with("[row-11] 11"));
        assert_eq!(rendered.previous, NavControl { target: 2, enabled: true });
        assert_eq!(rendered.next, NavControl { target: 4, enabled: true });
        let numbers: Vec<u32> = rendered.page_links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            rendered.summary,
            Some(Summary { first: 11, last: 15, total: 23 })
        );
        assert_eq!(rendered.summary.unwrap().to_string(), "Showing 11 to 15 of 23 entries");
    }

    #[test]
    fn test_controls_disabled_at_boundaries() {
        let v = view(PagerOptions::default());
        let first = v.render(&snapshot(1, 5, 23, false));
        assert!(!first.previous.enabled);
        assert_eq!(first.previous.target, 1);

        let last = v.render(&snapshot(5, 5, 23, false));
        assert!(!last.next.enabled);
        assert_eq!(last.next.target, 5);
        assert_eq!(last.summary, Some(Summary { first: 21, last: 23, total: 23 }));
    }

    #[test]
    fn test_loading_marks_active_link_only() {
        let rendered = view(PagerOptions::default()).render(&snapshot(2, 5, 23, true));
        for link in &rendered.page_links {
            assert_eq!(link.active, link.number == 2);
            assert_eq!(link.loading, link.number == 2);
        }
        assert!(rendered.to_string().contains("[2…]"));
    }

    #[test]
    fn test_window_limited_by_max_pages_shown() {
        let options = PagerOptions {
            max_pages_shown: 3,
            ..Default::default()
        };
        let rendered = view(options).render(&snapshot(10, 5, 100, false));
        let numbers: Vec<u32> = rendered.page_links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![9, 10, 11]);
    }

    #[test]
    fn test_inline_page_list_only_hides_summary_and_selector() {
        let options = PagerOptions {
            inline_page_list_only: true,
            id: Some("release-list".to_string()),
            ..Default::default()
        };
        let rendered = view(options).render(&snapshot(1, 5, 23, false));
        assert_eq!(rendered.summary, None);
        assert_eq!(rendered.size_selector, None);
        assert_eq!(rendered.container_id.as_deref(), Some("release-list"));

        let text = rendered.to_string();
        assert!(text.starts_with("#release-list"));
        assert!(!text.contains("Showing"));
        assert!(!text.contains("Per page"));
    }

    #[test]
    fn test_size_selector_marks_selected() {
        let rendered = view(PagerOptions::default()).render(&snapshot(1, 25, 23, false));
        let selector = rendered.size_selector.clone().unwrap();
        assert_eq!(selector.options, vec![5, 25, 50, 100]);
        assert_eq!(selector.selected, 25);
        assert!(rendered.to_string().contains("Per page: 5 *25 50 100"));
    }

    #[test]
    fn test_empty_result_set() {
        let rendered = view(PagerOptions::default()).render(&snapshot(1, 25, 0, false));
        assert!(rendered.body.is_empty());
        assert_eq!(rendered.page_links.len(), 1);
        assert_eq!(rendered.summary, Some(Summary { first: 0, last: 0, total: 0 }));
    }

    #[test]
    fn test_render_last_of_u32_max_pages() {
        let total = u32::MAX as u64 * 5;
        let snapshot = PageSnapshot {
            current_page: u32::MAX,
            page_size: 5,
            items: Vec::<u32>::new(),
            total_item_count: total,
            is_loading: false,
            max_page: crate::pagination::page_count(total, 5),
        };
        let rendered = view(PagerOptions::default()).render(&snapshot);

        assert_eq!(rendered.next, NavControl { target: u32::MAX, enabled: false });
        assert_eq!(rendered.page_links.len(), 9);
        assert_eq!(rendered.page_links.last().map(|l| l.number), Some(u32::MAX));
        assert_eq!(rendered.summary.map(|s| s.last), Some(total));
    }

    #[test]
    fn test_closure_display_component() {
        let table = |items: &[u32], id: &dyn Fn(&u32) -> String| {
            items.iter().map(|i| id(i)).collect::<Vec<_>>().join(",")
        };
        let v = PaginationView::new(PagerOptions::default(), table, |n: &u32| n.to_string());
        let rendered = v.render(&snapshot(1, 5, 23, false));
        assert_eq!(rendered.body, "1,2,3,4,5");
    }

    #[test]
    fn test_action_for_link() {
        let rendered = view(PagerOptions::default()).render(&snapshot(2, 5, 23, false));
        assert_eq!(rendered.action_for_link(4), Some(ViewAction::GoToPage(4)));
        // Clicking the active page does nothing
        assert_eq!(rendered.action_for_link(2), None);
        assert_eq!(rendered.action_for_link(42), None);
    }
}
