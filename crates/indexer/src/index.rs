//! One page of the `supertux-addons` index.

use addonhub_core::addon::pagination::IndexPage;
use addonhub_core::addon::sexp::{self, ADDON_HEADER};
use addonhub_core::addon::{Converter, RepositoryInfo};
use addonhub_core::config::AddonConfig;
use addonhub_core::error::CoreError;
use addonhub_db::repositories::RepositoryRepo;
use addonhub_db::PgStore;
use tokio_util::sync::CancellationToken;

/// Indent of each add-on entry inside the index block.
const ENTRY_INDENT: usize = 2;

/// Render page `page` of the index with `limit` entries per page.
///
/// Add-ons that fail to convert or render are logged and left out of the
/// page; only cancellation and listing failures abort.
pub async fn render_page(
    store: &PgStore,
    config: &AddonConfig,
    cancel: &CancellationToken,
    page: i64,
    limit: i64,
) -> anyhow::Result<String> {
    let total = RepositoryRepo::count_addons(store.pool(), &config.reserved_owner).await?;
    let page = IndexPage::new(Some(page), Some(limit), total);

    let repos = RepositoryRepo::list_addon_page(
        store.pool(),
        &config.reserved_owner,
        page.limit,
        page.offset(),
    )
    .await?;
    tracing::debug!(
        page = page.page,
        total_pages = page.total_pages,
        listed = repos.len(),
        "Listed add-on repositories"
    );

    let converter = Converter::new(store, store, config);
    let mut entries = Vec::with_capacity(repos.len());
    for row in repos {
        let repo = RepositoryInfo::from(row);
        match render_entry(&converter, cancel, &repo).await {
            Ok(entry) => entries.push(entry),
            Err(CoreError::Cancelled) => return Err(CoreError::Cancelled.into()),
            Err(e) => {
                tracing::warn!(
                    repo_id = repo.id,
                    error = %e,
                    "Omitting add-on from index: {}",
                    e.user_message()
                );
            }
        }
    }

    let previous = page.previous_link(config);
    let next = page.next_link(config);
    let index = sexp::render_index(
        &entries,
        previous.as_deref(),
        next.as_deref(),
        page.total_pages,
    )?;
    Ok(index)
}

async fn render_entry(
    converter: &Converter<'_>,
    cancel: &CancellationToken,
    repo: &RepositoryInfo,
) -> Result<String, CoreError> {
    let descriptor = converter.to_descriptor(cancel, repo).await?;
    sexp::render(&descriptor, ADDON_HEADER, ENTRY_INDENT)
}
