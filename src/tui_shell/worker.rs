//! Gateway calls run off the UI thread; results come back as events.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::gateway::{CliResponse, GatewayError, RestClient};
use crate::model::{BundleInfo, Worksheet};
use crate::routes::{self, Resolved, Route};
use crate::schema::SchemaUpdate;
use crate::terminal::Effect;

/// Which editor a save belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum SaveTarget {
    /// Server ids of the schema block.
    Block(Vec<i64>),
    Draft,
}

#[derive(Debug)]
pub(super) enum WorkerEvent {
    Resolved {
        route: Route,
        resolved: Resolved,
    },
    WorksheetLoaded {
        uuid: String,
        result: Result<Worksheet, GatewayError>,
    },
    BundleLoaded {
        uuid: String,
        result: Result<BundleInfo, GatewayError>,
    },
    SchemaSaved {
        worksheet_uuid: String,
        target: SaveTarget,
        result: Result<(), GatewayError>,
    },
    Executed {
        request_id: u64,
        result: Result<CliResponse, GatewayError>,
    },
    Completed {
        request_id: u64,
        prefix: String,
        result: Result<Vec<String>, GatewayError>,
    },
    Downloaded {
        uuid: String,
        result: Result<PathBuf, String>,
    },
}

fn spawn(tx: &Sender<WorkerEvent>, job: impl FnOnce() -> WorkerEvent + Send + 'static) {
    let tx = tx.clone();
    std::thread::spawn(move || {
        // The UI may have exited; nothing left to notify.
        let _ = tx.send(job());
    });
}

pub(super) fn resolve(tx: &Sender<WorkerEvent>, client: &RestClient, route: Route) {
    let client = client.clone();
    spawn(tx, move || WorkerEvent::Resolved {
        route: route.clone(),
        resolved: routes::resolve(&client, route),
    });
}

pub(super) fn load_worksheet(tx: &Sender<WorkerEvent>, client: &RestClient, uuid: &str) {
    let client = client.clone();
    let uuid = uuid.to_string();
    spawn(tx, move || WorkerEvent::WorksheetLoaded {
        result: client.get_worksheet(&uuid),
        uuid,
    });
}

pub(super) fn load_bundle(tx: &Sender<WorkerEvent>, client: &RestClient, uuid: &str) {
    let client = client.clone();
    let uuid = uuid.to_string();
    spawn(tx, move || WorkerEvent::BundleLoaded {
        result: client.get_bundle(&uuid),
        uuid,
    });
}

pub(super) fn save_schema(
    tx: &Sender<WorkerEvent>,
    client: &RestClient,
    worksheet_uuid: &str,
    target: SaveTarget,
    update: SchemaUpdate,
) {
    let client = client.clone();
    let worksheet_uuid = worksheet_uuid.to_string();
    spawn(tx, move || WorkerEvent::SchemaSaved {
        result: client.update_schema_block(&worksheet_uuid, &update),
        worksheet_uuid,
        target,
    });
}

pub(super) fn run_effect(tx: &Sender<WorkerEvent>, client: &RestClient, effect: Effect) {
    let client = client.clone();
    match effect {
        Effect::Execute {
            request_id,
            worksheet_uuid,
            command,
        } => spawn(tx, move || WorkerEvent::Executed {
            request_id,
            result: client.execute_command(&worksheet_uuid, &command),
        }),
        Effect::Complete {
            request_id,
            worksheet_uuid,
            prefix,
        } => spawn(tx, move || WorkerEvent::Completed {
            request_id,
            result: client.complete_command(&worksheet_uuid, &prefix),
            prefix,
        }),
    }
}

/// Downloads a bundle's contents into `dest`.
pub(super) fn download(
    tx: &Sender<WorkerEvent>,
    client: &RestClient,
    uuid: &str,
    dest: PathBuf,
) {
    let client = client.clone();
    let uuid = uuid.to_string();
    spawn(tx, move || {
        let result = client
            .download_contents(&uuid)
            .map_err(|e| e.message)
            .and_then(|bytes| {
                std::fs::write(&dest, bytes)
                    .map(|()| dest.clone())
                    .map_err(|e| format!("write {}: {}", dest.display(), e))
            });
        WorkerEvent::Downloaded { uuid, result }
    });
}
