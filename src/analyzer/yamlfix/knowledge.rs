//! Static field knowledge for Kubernetes-style manifests.
//!
//! Read-only lookup tables built once per process: known fields, the alias
//! map for common misspellings, typed fields, closed vocabularies for
//! coercion, and per-kind nesting rules used by the structural reorganizer.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::analyzer::yamlfix::types::Evidence;

/// Recognized field names for the manifest schema family.
static KNOWN_FIELDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Object envelope
        "apiVersion", "kind", "metadata", "spec", "status", "data", "stringData",
        // Metadata
        "name", "namespace", "labels", "annotations", "generateName",
        // Workload spec
        "replicas", "selector", "matchLabels", "matchExpressions", "template", "strategy",
        "rollingUpdate", "maxSurge", "maxUnavailable", "minReadySeconds",
        "revisionHistoryLimit", "progressDeadlineSeconds", "paused", "serviceName",
        "podManagementPolicy", "updateStrategy", "volumeClaimTemplates",
        // Jobs
        "schedule", "jobTemplate", "concurrencyPolicy", "suspend",
        "successfulJobsHistoryLimit", "failedJobsHistoryLimit", "startingDeadlineSeconds",
        "backoffLimit", "completions", "parallelism", "activeDeadlineSeconds",
        "ttlSecondsAfterFinished",
        // Pod spec
        "containers", "initContainers", "volumes", "restartPolicy", "nodeSelector",
        "serviceAccountName", "serviceAccount", "affinity", "tolerations", "hostNetwork",
        "hostPID", "hostIPC", "dnsPolicy", "terminationGracePeriodSeconds",
        "imagePullSecrets", "priorityClassName", "automountServiceAccountToken",
        "securityContext",
        // Containers
        "image", "imagePullPolicy", "command", "args", "workingDir", "ports",
        "containerPort", "hostPort", "protocol", "env", "envFrom", "value", "valueFrom",
        "secretKeyRef", "configMapKeyRef", "fieldRef", "fieldPath", "key", "resources",
        "limits", "requests", "cpu", "memory", "volumeMounts", "mountPath", "subPath",
        "readOnly", "livenessProbe", "readinessProbe", "startupProbe", "httpGet",
        "tcpSocket", "exec", "initialDelaySeconds", "periodSeconds", "timeoutSeconds",
        "successThreshold", "failureThreshold", "stdin", "tty",
        // Security context
        "runAsUser", "runAsGroup", "runAsNonRoot", "privileged", "allowPrivilegeEscalation",
        "readOnlyRootFilesystem", "capabilities", "add", "drop", "fsGroup",
        // Volumes
        "configMap", "secret", "secretName", "persistentVolumeClaim", "claimName",
        "emptyDir", "hostPath", "path", "items", "defaultMode", "mode", "optional",
        // Services and ingress
        "type", "port", "targetPort", "nodePort", "clusterIP", "externalTrafficPolicy",
        "sessionAffinity", "loadBalancerIP", "rules", "host", "http", "paths", "pathType",
        "backend", "service", "number", "tls", "hosts", "ingressClassName", "scheme",
        // Storage and autoscaling
        "accessModes", "storageClassName", "storage", "minReplicas", "maxReplicas",
        "scaleTargetRef", "metrics", "targetCPUUtilizationPercentage",
        // Tolerations and selectors
        "operator", "effect", "values", "topologyKey", "weight", "nodeName",
        // RBAC and service accounts
        "secrets", "subjects", "roleRef", "apiGroups", "verbs", "resourceNames",
        // Lifecycle and misc pod fields
        "lifecycle", "preStop", "postStart", "hostname", "subdomain", "hostAliases",
        "hostnames", "ip", "containerName", "divisor", "sizeLimit", "medium",
        "defaultBackend",
    ]
    .into_iter()
    .collect()
});

/// Misspellings and variants mapped to their canonical field.
static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("apiversion", "apiVersion"),
        ("apiVerison", "apiVersion"),
        ("apVersion", "apiVersion"),
        ("api_version", "apiVersion"),
        ("api-version", "apiVersion"),
        ("knd", "kind"),
        ("kidn", "kind"),
        ("metdata", "metadata"),
        ("metadta", "metadata"),
        ("metadat", "metadata"),
        ("meatdata", "metadata"),
        ("metaData", "metadata"),
        ("meta", "metadata"),
        ("nmae", "name"),
        ("anme", "name"),
        ("nme", "name"),
        ("namepsace", "namespace"),
        ("namespce", "namespace"),
        ("nampespace", "namespace"),
        ("lables", "labels"),
        ("labes", "labels"),
        ("label", "labels"),
        ("anotations", "annotations"),
        ("annotation", "annotations"),
        ("spce", "spec"),
        ("sepc", "spec"),
        ("specs", "spec"),
        ("replica", "replicas"),
        ("replcas", "replicas"),
        ("repicas", "replicas"),
        ("replicaCount", "replicas"),
        ("selctor", "selector"),
        ("selecter", "selector"),
        ("matchlabels", "matchLabels"),
        ("matchLabel", "matchLabels"),
        ("tempalte", "template"),
        ("templte", "template"),
        ("temlpate", "template"),
        ("container", "containers"),
        ("containres", "containers"),
        ("contianers", "containers"),
        ("containters", "containers"),
        ("imgae", "image"),
        ("iamge", "image"),
        ("img", "image"),
        ("imagepullpolicy", "imagePullPolicy"),
        ("pullPolicy", "imagePullPolicy"),
        ("prots", "ports"),
        ("portss", "ports"),
        ("containerport", "containerPort"),
        ("contianerPort", "containerPort"),
        ("targetport", "targetPort"),
        ("nodeport", "nodePort"),
        ("enviroment", "env"),
        ("environment", "env"),
        ("envs", "env"),
        ("resource", "resources"),
        ("resouces", "resources"),
        ("resourses", "resources"),
        ("limit", "limits"),
        ("request", "requests"),
        ("volumemounts", "volumeMounts"),
        ("volumeMount", "volumeMounts"),
        ("mountpath", "mountPath"),
        ("volume", "volumes"),
        ("restartpolicy", "restartPolicy"),
        ("nodeselector", "nodeSelector"),
        ("serviceaccountname", "serviceAccountName"),
        ("livenessprobe", "livenessProbe"),
        ("readinessprobe", "readinessProbe"),
        ("commands", "command"),
        ("cmd", "command"),
        ("arg", "args"),
        ("arguments", "args"),
        ("securitycontext", "securityContext"),
        ("initcontainers", "initContainers"),
    ]
    .into_iter()
    .collect()
});

/// Known fields keyed by lowercase spelling, for case-folded lookups.
static KNOWN_FIELDS_FOLDED: LazyLock<HashMap<String, &'static str>> =
    LazyLock::new(|| KNOWN_FIELDS.iter().map(|f| (f.to_lowercase(), *f)).collect());

/// Aliases keyed by lowercase spelling.
static ALIASES_FOLDED: LazyLock<HashMap<String, &'static str>> =
    LazyLock::new(|| ALIASES.iter().map(|(k, v)| (k.to_lowercase(), *v)).collect());

/// Fields whose value must be a number.
static NUMERIC_FIELDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "replicas", "containerPort", "hostPort", "port", "targetPort", "nodePort",
        "minReadySeconds", "revisionHistoryLimit", "progressDeadlineSeconds",
        "initialDelaySeconds", "periodSeconds", "timeoutSeconds", "successThreshold",
        "failureThreshold", "terminationGracePeriodSeconds", "runAsUser", "runAsGroup",
        "fsGroup", "backoffLimit", "completions", "parallelism", "activeDeadlineSeconds",
        "ttlSecondsAfterFinished", "minReplicas", "maxReplicas", "successfulJobsHistoryLimit",
        "failedJobsHistoryLimit", "startingDeadlineSeconds", "targetCPUUtilizationPercentage",
        "defaultMode", "number",
    ]
    .into_iter()
    .collect()
});

/// Fields whose value must be a boolean.
static BOOLEAN_FIELDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "privileged", "allowPrivilegeEscalation", "readOnlyRootFilesystem", "runAsNonRoot",
        "readOnly", "hostNetwork", "hostPID", "hostIPC", "automountServiceAccountToken",
        "stdin", "tty", "paused", "suspend", "optional",
    ]
    .into_iter()
    .collect()
});

static NUMBER_WORDS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    [
        ("zero", 0), ("one", 1), ("two", 2), ("three", 3), ("four", 4), ("five", 5),
        ("six", 6), ("seven", 7), ("eight", 8), ("nine", 9), ("ten", 10), ("eleven", 11),
        ("twelve", 12), ("thirteen", 13), ("fourteen", 14), ("fifteen", 15),
        ("sixteen", 16), ("seventeen", 17), ("eighteen", 18), ("nineteen", 19),
        ("twenty", 20), ("thirty", 30), ("forty", 40), ("fifty", 50), ("sixty", 60),
        ("hundred", 100),
    ]
    .into_iter()
    .collect()
});

static BOOLEAN_WORDS: LazyLock<HashMap<&'static str, bool>> = LazyLock::new(|| {
    [
        ("true", true), ("yes", true), ("y", true), ("on", true), ("enabled", true),
        ("enable", true), ("false", false), ("no", false), ("n", false), ("off", false),
        ("disabled", false), ("disable", false),
    ]
    .into_iter()
    .collect()
});

/// Keys that belong at the root of every resource.
pub const TOP_LEVEL_FIELDS: &[&str] = &[
    "apiVersion", "kind", "metadata", "spec", "status", "data", "stringData",
];

/// Parents whose children are user-defined keys, never typo candidates.
pub const FREEFORM_PARENTS: &[&str] = &[
    "labels", "annotations", "matchLabels", "data", "stringData", "nodeSelector",
];

/// Parents whose list items are plain strings, never `key value` pairs.
pub const STRING_LIST_PARENTS: &[&str] = &[
    "command", "args", "values", "accessModes", "hosts", "add", "drop", "verbs", "apiGroups",
];

/// Fields that live under `metadata`.
pub const METADATA_FIELDS: &[&str] = &["name", "namespace", "labels", "annotations"];

/// Pod-level fields, found under `spec.template.spec` for workloads.
pub const POD_SPEC_FIELDS: &[&str] = &[
    "containers", "initContainers", "volumes", "restartPolicy", "nodeSelector",
    "serviceAccountName", "affinity", "tolerations", "hostNetwork", "imagePullSecrets",
    "terminationGracePeriodSeconds", "dnsPolicy", "priorityClassName",
];

/// Canonical order of root keys after a structural move.
pub const ROOT_KEY_ORDER: &[&str] = &[
    "apiVersion", "kind", "metadata", "spec", "data", "stringData", "status",
];

/// Where a kind's pod-level fields belong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodFieldTarget {
    /// Kind has no pod template.
    None,
    /// Directly under `spec` (Pod).
    Spec,
    /// Under `spec.template.spec` (workloads).
    Template,
}

/// Nesting rules for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct NestingRules {
    pub kind: &'static str,
    /// Root-level fields that belong under `spec`.
    pub spec_fields: &'static [&'static str],
    pub pod_fields: PodFieldTarget,
}

const WORKLOAD_SPEC_FIELDS: &[&str] = &[
    "replicas", "selector", "template", "strategy", "minReadySeconds", "revisionHistoryLimit",
    "progressDeadlineSeconds", "paused",
];

const STATEFULSET_SPEC_FIELDS: &[&str] = &[
    "replicas", "selector", "template", "serviceName", "podManagementPolicy", "updateStrategy",
    "volumeClaimTemplates", "minReadySeconds", "revisionHistoryLimit",
];

const DAEMONSET_SPEC_FIELDS: &[&str] = &[
    "selector", "template", "updateStrategy", "minReadySeconds", "revisionHistoryLimit",
];

const JOB_SPEC_FIELDS: &[&str] = &[
    "template", "backoffLimit", "completions", "parallelism", "activeDeadlineSeconds",
    "ttlSecondsAfterFinished", "selector",
];

const CRONJOB_SPEC_FIELDS: &[&str] = &[
    "schedule", "jobTemplate", "concurrencyPolicy", "suspend", "successfulJobsHistoryLimit",
    "failedJobsHistoryLimit", "startingDeadlineSeconds",
];

const SERVICE_SPEC_FIELDS: &[&str] = &[
    "type", "ports", "selector", "clusterIP", "externalTrafficPolicy", "sessionAffinity",
    "loadBalancerIP",
];

const fn rules(
    kind: &'static str,
    spec_fields: &'static [&'static str],
    pod_fields: PodFieldTarget,
) -> NestingRules {
    NestingRules {
        kind,
        spec_fields,
        pod_fields,
    }
}

const NESTING_RULES: &[NestingRules] = &[
    rules("Deployment", WORKLOAD_SPEC_FIELDS, PodFieldTarget::Template),
    rules("ReplicaSet", WORKLOAD_SPEC_FIELDS, PodFieldTarget::Template),
    rules("StatefulSet", STATEFULSET_SPEC_FIELDS, PodFieldTarget::Template),
    rules("DaemonSet", DAEMONSET_SPEC_FIELDS, PodFieldTarget::Template),
    rules("Job", JOB_SPEC_FIELDS, PodFieldTarget::Template),
    rules("CronJob", CRONJOB_SPEC_FIELDS, PodFieldTarget::None),
    rules("Pod", &[], PodFieldTarget::Spec),
    rules("Service", SERVICE_SPEC_FIELDS, PodFieldTarget::None),
];

/// A resolved field name plus how it was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub canonical: &'static str,
    pub evidence: Evidence,
}

/// Whether `field` is a recognized field name (exact spelling).
pub fn is_known_field(field: &str) -> bool {
    KNOWN_FIELDS.contains(field)
}

/// Whether `field` belongs at the root of a resource.
pub fn is_top_level_field(field: &str) -> bool {
    TOP_LEVEL_FIELDS.contains(&field)
}

/// Whether keys under `parent` are user data.
pub fn is_freeform_parent(parent: &str) -> bool {
    FREEFORM_PARENTS.contains(&parent)
}

/// Whether list items under `parent` are plain strings.
pub fn is_string_list_parent(parent: &str) -> bool {
    STRING_LIST_PARENTS.contains(&parent)
}

pub fn is_numeric_field(field: &str) -> bool {
    NUMERIC_FIELDS.contains(field)
}

pub fn is_boolean_field(field: &str) -> bool {
    BOOLEAN_FIELDS.contains(field)
}

/// Digit value of a number word ("three" -> 3), case-insensitive.
pub fn number_word(word: &str) -> Option<u32> {
    NUMBER_WORDS.get(word.to_lowercase().as_str()).copied()
}

/// Canonical boolean for a boolean word ("yes" -> true), case-insensitive.
pub fn boolean_word(word: &str) -> Option<bool> {
    BOOLEAN_WORDS.get(word.to_lowercase().as_str()).copied()
}

/// Nesting rules for a resource kind.
pub fn nesting_rules(kind: &str) -> Option<&'static NestingRules> {
    NESTING_RULES.iter().find(|r| r.kind == kind)
}

/// Resolve a token to its canonical field.
///
/// Lookup order: exact known field, exact alias, case-folded alias,
/// case-folded known field, then a single-edit match against a unique known
/// field when `allow_fuzzy` is set and the token is long enough to make that
/// meaningful.
pub fn resolve_field(token: &str, allow_fuzzy: bool) -> Option<FieldMatch> {
    if token.is_empty() {
        return None;
    }
    if let Some(&canonical) = KNOWN_FIELDS.get(token) {
        return Some(FieldMatch { canonical, evidence: Evidence::KnownField });
    }
    if let Some(&canonical) = ALIASES.get(token) {
        return Some(FieldMatch { canonical, evidence: Evidence::Alias });
    }

    let folded = token.to_lowercase();
    if let Some(&canonical) = ALIASES_FOLDED.get(&folded) {
        return Some(FieldMatch { canonical, evidence: Evidence::CaseFold });
    }
    if let Some(&canonical) = KNOWN_FIELDS_FOLDED.get(&folded) {
        return Some(FieldMatch { canonical, evidence: Evidence::CaseFold });
    }

    if allow_fuzzy && token.chars().count() >= 6 {
        let mut candidates = KNOWN_FIELDS
            .iter()
            .filter(|field| within_one_edit(&folded, &field.to_lowercase()));
        if let (Some(&canonical), None) = (candidates.next(), candidates.next()) {
            return Some(FieldMatch { canonical, evidence: Evidence::Fuzzy });
        }
    }

    None
}

/// True when `a` and `b` differ by at most one insertion, deletion,
/// substitution, or adjacent transposition.
fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a == b {
        return true;
    }

    match a.len() as isize - b.len() as isize {
        0 => {
            let diffs: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
            match diffs.as_slice() {
                [_] => true,
                [i, j] => *j == i + 1 && a[*i] == b[*j] && a[*j] == b[*i],
                _ => false,
            }
        }
        1 => one_deletion(&a, &b),
        -1 => one_deletion(&b, &a),
        _ => false,
    }
}

/// True when removing one char from `longer` yields `shorter`.
fn one_deletion(longer: &[char], shorter: &[char]) -> bool {
    let mut i = 0;
    let mut j = 0;
    let mut skipped = false;
    while i < longer.len() && j < shorter.len() {
        if longer[i] == shorter[j] {
            i += 1;
            j += 1;
        } else if skipped {
            return false;
        } else {
            skipped = true;
            i += 1;
        }
    }
    true
}
