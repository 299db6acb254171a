//! Tag universe listing (`postdeck tags`).

use anyhow::Result;
use postdeck_core::models::FacetGroup;

use crate::acquire;
use crate::config::Config;
use crate::view::TagsView;

pub async fn run_tags(config: &Config, json: bool) -> Result<()> {
    let store = acquire::load_corpus(config).await?;
    let tags = TagsView::new(store.tag_universe());

    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    for group in FacetGroup::ALL {
        let labels = tags.get(group);
        println!("{} ({})", group.as_str(), labels.len());
        for facet in labels {
            if facet.label == facet.id {
                println!("  {}", facet.id);
            } else {
                println!("  {}  [{}]", facet.label, facet.id);
            }
        }
    }

    Ok(())
}
