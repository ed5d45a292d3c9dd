use toys::Toy;

use crate::engine::{Engine, Variables};

/// A copy of `toy` with placeholders resolved in the url, header keys and
/// values, param keys and values, path segments and body.
///
/// Name, method and version are copied unchanged.
pub fn resolve_toy(engine: &Engine, toy: &Toy, variables: &Variables) -> Toy {
    let resolve = |text: &str| engine.resolve(text, variables);

    Toy {
        name: toy.name.clone(),
        url: resolve(&toy.url),
        method: toy.method.clone(),
        http_version: toy.http_version.clone(),
        header: toy
            .header
            .iter()
            .map(|(k, v)| (resolve(k), resolve(v)))
            .collect(),
        param: toy
            .param
            .iter()
            .map(|(k, v)| (resolve(k), resolve(v)))
            .collect(),
        path_segments: toy.path_segments.iter().map(|s| resolve(s)).collect(),
        body: resolve(&toy.body),
    }
}
