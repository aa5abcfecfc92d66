//! Path fixtures shared by unit and integration tests.

/// The anatomy set: twenty paths that differ only in two middle segments,
/// plus three short paths under `chest`.
///
/// Every path ends in a `leg`, `foot` or `heel` tail, which makes `leg` and
/// `foot` the two most used segment names once the graph is merged.
pub fn body_paths() -> Vec<String> {
    let mut paths: Vec<String> = (0..20)
        .map(|i| format!("/head/neck/shoulders/heart{i}/waist{i}/leg/foot/heel"))
        .collect();

    paths.push("/head/neck/shoulders/chest/leg".to_string());
    paths.push("/head/neck/shoulders/chest/foot".to_string());
    paths.push("/head/neck/shoulders/chest/torso/leg".to_string());
    paths
}

/// `count` paths of the form `/content/dist{i}/jboss/source{i}`, which share
/// almost nothing beyond the first and third segment.
pub fn dist_paths(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("/content/dist{i}/jboss/source{i}"))
        .collect()
}

/// A realistic product content set: several releases and architectures of
/// the same repository layout.
pub fn product_paths() -> Vec<String> {
    let mut paths = Vec::new();
    for stream in ["dist", "beta"] {
        for release in ["7", "8", "9"] {
            for arch in ["x86_64", "aarch64", "ppc64le", "s390x"] {
                for repo in ["os", "debug", "source/SRPMS"] {
                    paths.push(format!(
                        "/content/{stream}/rhel/server/{release}/{arch}/{repo}"
                    ));
                }
            }
        }
    }
    paths
}
