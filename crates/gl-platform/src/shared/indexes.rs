//! MongoDB Index Initialization
//!
//! Creates indexes for the events collection on application startup.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_event_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_event_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let events = db.collection::<mongodb::bson::Document>("events");

    // Upcoming/latest views and every sort order
    events
        .create_index(
            IndexModel::builder()
                .keys(doc! { "date": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    // Managed listing and the ownership half of the joined listing
    events
        .create_index(
            IndexModel::builder()
                .keys(doc! { "createdByEmail": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    // Membership half of the joined listing (multikey over the array)
    events
        .create_index(
            IndexModel::builder()
                .keys(doc! { "joinedUsers": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on events");
    Ok(())
}
