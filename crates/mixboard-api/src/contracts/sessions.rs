use serde_json::Value;

use mixboard_types::api::{CreateSessionRequest, FieldUpdate, FolderRequest, UpdateSessionRequest};
use mixboard_types::models::{FrequencyBands, ReferenceAnalysis};

use super::{Checker, ContractResult, at, root};

pub fn create_session(body: &Value) -> ContractResult<CreateSessionRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = c.required(obj, "", "name").and_then(|v| c.name(v, "name"));
    let folder_id = c.nullable(obj, "", "folderId", Checker::uuid);
    let analysis = Checker::optional(obj, "referenceAnalysis")
        .and_then(|v| reference_analysis(&mut c, v, "referenceAnalysis"));

    let request = (|| -> Option<CreateSessionRequest> {
        Some(CreateSessionRequest {
            name: name?,
            folder_id: match folder_id? {
                FieldUpdate::Set(id) => Some(id),
                FieldUpdate::Keep | FieldUpdate::Clear => None,
            },
            reference_analysis: analysis,
        })
    })();
    c.finish(request)
}

/// `folderId`: absent leaves the folder alone, `null` detaches, a UUID moves
/// the session. An empty string is not a way to say "no folder".
pub fn update_session(body: &Value) -> ContractResult<UpdateSessionRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = Checker::optional(obj, "name").and_then(|v| c.name(v, "name"));
    let folder_id = c.nullable(obj, "", "folderId", Checker::uuid);

    let request = folder_id.map(|folder_id| UpdateSessionRequest { name, folder_id });
    c.finish(request)
}

pub fn attach_reference_analysis(body: &Value) -> ContractResult<ReferenceAnalysis> {
    let mut c = Checker::default();
    let analysis = reference_analysis(&mut c, body, "");
    c.finish(analysis)
}

fn reference_analysis(c: &mut Checker, value: &Value, path: &str) -> Option<ReferenceAnalysis> {
    let obj = c.object(value, path)?;

    let filename = c
        .required(obj, path, "filename")
        .and_then(|v| c.non_empty(v, &at(path, "filename")));
    let lufs_integrated = c
        .required(obj, path, "lufs_integrated")
        .and_then(|v| c.number(v, &at(path, "lufs_integrated")));
    let true_peak = c
        .required(obj, path, "true_peak")
        .and_then(|v| c.number(v, &at(path, "true_peak")));

    let bands_path = at(path, "frequency_bands");
    let bands = c
        .required(obj, path, "frequency_bands")
        .and_then(|v| frequency_bands(c, v, &bands_path));

    let spectrum_path = at(path, "spectrum_data");
    let spectrum_data = match Checker::optional(obj, "spectrum_data") {
        None => Some(None),
        Some(v) => c.array(v, &spectrum_path).and_then(|values| {
            let points: Vec<Option<f64>> = values
                .iter()
                .enumerate()
                .map(|(i, v)| c.number(v, &at(&spectrum_path, i)))
                .collect();
            points.into_iter().collect::<Option<Vec<_>>>().map(Some)
        }),
    };

    Some(ReferenceAnalysis {
        filename: filename?,
        lufs_integrated: lufs_integrated?,
        true_peak: true_peak?,
        frequency_bands: bands?,
        spectrum_data: spectrum_data?,
    })
}

fn frequency_bands(c: &mut Checker, value: &Value, path: &str) -> Option<FrequencyBands> {
    let obj = c.object(value, path)?;
    let [sub_bass, bass, low_mids, mids, high_mids, highs] =
        ["sub_bass", "bass", "low_mids", "mids", "high_mids", "highs"]
            .map(|key| c.required(obj, path, key).and_then(|v| c.number(v, &at(path, key))));

    Some(FrequencyBands {
        sub_bass: sub_bass?,
        bass: bass?,
        low_mids: low_mids?,
        mids: mids?,
        high_mids: high_mids?,
        highs: highs?,
    })
}

pub fn create_folder(body: &Value) -> ContractResult<FolderRequest> {
    folder(body)
}

pub fn update_folder(body: &Value) -> ContractResult<FolderRequest> {
    folder(body)
}

fn folder(body: &Value) -> ContractResult<FolderRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = c.required(obj, "", "name").and_then(|v| c.name(v, "name"));

    c.finish(name.map(|name| FolderRequest { name }))
}
