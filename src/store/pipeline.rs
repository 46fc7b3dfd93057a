//! Vote tally aggregation pipeline
//!
//! Stages:
//! 1. `$unwind` votes into one row per vote
//! 2. `$group` by (project id, voter ip), counting rows
//! 3. `$addFields` capping each pair's count
//! 4. `$group` by project id, summing capped counts into `totalVotes`
//! 5. `$sort` by `totalVotes` descending
//!
//! Projects without any vote drop out at the `$unwind` stage. Equal totals
//! keep whatever order the store produces.

use serde_json::{json, Value};

/// Build the aggregation pipeline with the given per-IP cap
pub fn tally_pipeline(cap: u64) -> Value {
    json!([
        { "$unwind": { "path": "$votes" } },
        {
            "$group": {
                "_id": { "ip": "$votes.ip", "id": "$_id" },
                "name": { "$first": "$name" },
                "votes": { "$sum": 1 }
            }
        },
        {
            "$addFields": {
                "cappedVotes": {
                    "$cond": [ { "$gt": ["$votes", cap] }, cap, "$votes" ]
                }
            }
        },
        {
            "$group": {
                "_id": "$_id.id",
                "name": { "$first": "$name" },
                "totalVotes": { "$sum": "$cappedVotes" }
            }
        },
        { "$sort": { "totalVotes": -1 } }
    ])
}
