//! The pipeline driver: orchestrates the ordered passes,
//! owns the registry and import maps for the duration of one run, and holds
//! the single-writer flush stage that is the only path through which the
//! store is mutated after pass 1 completes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::application::import_map::build_import_map;
use crate::application::ports::{looks_like_env_key, GraphStore, HistoryAnalyser, PipelineBackend, ResolveCtx};
use crate::application::registry::{SymbolRegistry, SymbolRegistryBuilder};
use crate::application::PipelineConfig;
use crate::domain::{CancellationToken, Edge, EdgeType, Node, NodeLabel, PipelineError, ResolvedEdge};

/// Summary counts returned from a run; a count is useful for the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub nodes_upserted: usize,
    pub edges_inserted: usize,
}

/// One file's worth of pass-1 output, already loaded into the backend.
struct LoadedFile {
    rel_path: PathBuf,
    module_qn: String,
}

pub struct PipelineDriver {
    backend: Arc<dyn PipelineBackend>,
    store: Arc<dyn GraphStore>,
    config: PipelineConfig,
    history: Option<Arc<dyn HistoryAnalyser>>,
}

impl PipelineDriver {
    pub fn new(backend: Arc<dyn PipelineBackend>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            backend,
            store,
            config: PipelineConfig::default(),
            history: None,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Injects the git-history analyser. Without
    /// one, `run()` simply skips the FILE_CHANGES_WITH pass — a repo that
    /// isn't under version control, or a caller that doesn't care about
    /// change coupling, never has to supply it.
    pub fn with_history_analyser(mut self, history: Arc<dyn HistoryAnalyser>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_file_size_cap(mut self, cap_bytes: u64) -> Self {
        self.config.file_size_cap_bytes = cap_bytes;
        self
    }

    /// Full run: `project_name` should normally come from
    /// [`project_name_from_path`], but the caller derives it — project-name
    /// derivation from a path is an external collaborator, not this driver's job.
    pub async fn run(
        &self,
        project: &str,
        project_root: &Path,
        discovered_files: &[PathBuf],
        cancellation: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        self.store
            .upsert_project(project, &project_root.to_string_lossy())
            .await?;

        let mut outcome = RunOutcome::default();

        // --- Load stage: read bytes, strip BOM, enforce the size cap,
        // hand each file to the backend. Fatal per-file parse
        // errors and oversize files are skipped here and never enter any
        // later pass.
        let mut loaded: Vec<LoadedFile> = Vec::new();
        for rel_path in discovered_files {
            let abs_path = project_root.join(rel_path);
            let bytes = match std::fs::read(&abs_path) {
                Ok(b) => b,
                Err(e) => {
                    warn!(file = %rel_path.display(), error = %e, "failed to read file, skipping");
                    outcome.files_skipped += 1;
                    continue;
                }
            };
            if bytes.len() as u64 > self.config.file_size_cap_bytes {
                warn!(
                    file = %rel_path.display(),
                    size = bytes.len(),
                    cap = self.config.file_size_cap_bytes,
                    "file exceeds size cap, skipping"
                );
                outcome.files_skipped += 1;
                continue;
            }
            let stripped = strip_bom(bytes);
            match self.backend.load(rel_path, stripped) {
                Ok(()) => {
                    let module_qn = crate::domain::module_qualified_name(project, rel_path);
                    loaded.push(LoadedFile {
                            rel_path: rel_path.clone(),
                            module_qn,
                    });
                }
                Err(e) => {
                    warn!(file = %rel_path.display(), error = %e, "parse failed, skipping");
                    outcome.files_skipped += 1;
                }
            }
        }
        outcome.files_processed = loaded.len();

        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // --- Pass 1: parallel extraction, single-writer commit.
        let backend = self.backend.clone();
        let project_owned = project.to_string();
        let paths: Vec<PathBuf> = loaded.iter().map(|f| f.rel_path.clone()).collect();
        let extracted: Vec<_> = tokio::task::spawn_blocking(move || {
                paths
                    .par_iter()
                    .map(|path| {
                        let result = backend.extract(path, &project_owned);
                        (path.clone(), result)
                })
                    .collect::<Vec<_>>()
        })
            .await
            .map_err(|e| PipelineError::internal(format!("pass 1 extraction panicked: {e}")))?;

        let mut registry_builder = SymbolRegistryBuilder::new();
        let mut module_qn_for_file: HashMap<PathBuf, String> = HashMap::new();
        let mut raw_imports_for_module: HashMap<String, Vec<crate::application::ports::RawImport>> =
        HashMap::new();

        for (rel_path, result) in extracted {
            let extracted_file = match result {
                Ok(f) => f,
                Err(e) => {
                    warn!(file = %rel_path.display(), error = %e, "pass 1 extraction failed, skipping");
                    outcome.files_skipped += 1;
                    continue;
                }
            };

            let module_qn = crate::domain::module_qualified_name(project, &rel_path);
            module_qn_for_file.insert(rel_path.clone(), module_qn.clone());

            let mut module_node = extracted_file.module_node.unwrap_or_else(|| {
                    let name = rel_path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| module_qn.clone());
                    Node::new(
                        project,
                        NodeLabel::Module,
                        name,
                        module_qn.clone(),
                        rel_path.to_string_lossy(),
                        0,
                        0,
                    )
            });

            let constants_list: Vec<String> = extracted_file
                .constants
                .iter()
                .map(|(k, v)| format!("{k} = {v}"))
                .collect();
            module_node = module_node.with_property("constants", serde_json::json!(constants_list));
            let import_paths: Vec<String> =
            extracted_file.imports.iter().map(|i| i.path.clone()).collect();
            module_node = module_node.with_property("imports", serde_json::json!(import_paths));

            let module_id = self.store.upsert_node(module_node).await?;
            outcome.nodes_upserted += 1;
            registry_builder.register(
                module_qn.rsplit('.').next().unwrap_or(&module_qn),
                &module_qn,
                NodeLabel::Module,
            );

            let file_qn = format!("{module_qn}.__file__");
            let file_name = rel_path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| rel_path.to_string_lossy().into_owned());
            let file_node = Node::new(
                project,
                NodeLabel::File,
                file_name,
                file_qn,
                rel_path.to_string_lossy(),
                0,
                0,
            );
            self.store.upsert_node(file_node).await?;
            outcome.nodes_upserted += 1;

            raw_imports_for_module.insert(module_qn.clone(), extracted_file.imports.clone());

            // Declarations: upsert in walk order, tracking local QN -> id
            // so nested containers (classes owning methods, outer classes
            // owning nested classes) resolve without a store round-trip.
            let mut local_ids: HashMap<String, i64> = HashMap::new();
            local_ids.insert(module_qn.clone(), module_id);

            for decl in extracted_file.declarations {
                let qn = decl.node.qualified_name.clone();
                let label = decl.node.label;
                let name = decl.node.name.clone();
                let container_qn = decl.container_qn.clone();
                let id = self.store.upsert_node(decl.node).await?;
                outcome.nodes_upserted += 1;
                registry_builder.register(&name, &qn, label);
                local_ids.insert(qn.clone(), id);

                let container_id = match local_ids.get(&container_qn) {
                    Some(id) => Some(*id),
                    None => self
                        .store
                        .find_node_by_qn(project, &container_qn)
                        .await?
                        .and_then(|n| n.id()),
                };
                let Some(container_id) = container_id else {
                    warn!(qn = %qn, container = %container_qn, "container not found for declaration");
                    continue;
                };

                let edge_type = if label == NodeLabel::Method {
                    EdgeType::DefinesMethod
                } else {
                    EdgeType::Defines
                };
                self.store
                    .insert_edge(Edge::new(project, container_id, id, edge_type))
                    .await?;
                outcome.edges_inserted += 1;
            }
        }

        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let registry = Arc::new(registry_builder.seal());

        // --- Import maps: needs every Module registered.
        let mut import_maps: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (module_qn, imports) in &raw_imports_for_module {
            import_maps.insert(module_qn.clone(), build_import_map(imports, registry.as_ref()));
        }

        // --- env index for CONFIGURES, built once from
        // every module's constants.
        let env_index = self.build_env_index(project).await?;

        // --- Pass 2: type inference, embarrassingly parallel, no writer.
        let backend2 = self.backend.clone();
        let infer_paths: Vec<(PathBuf, String)> = loaded
            .iter()
            .filter_map(|f| module_qn_for_file.get(&f.rel_path).map(|m| (f.rel_path.clone(), m.clone())))
            .collect();
        let type_maps: HashMap<PathBuf, crate::application::ports::TypeMap> =
        tokio::task::spawn_blocking(move || {
                infer_paths
                    .par_iter()
                    .map(|(path, module_qn)| (path.clone(), backend2.infer_types(path, module_qn)))
                    .collect::<HashMap<_, _>>()
        })
            .await
            .map_err(|e| PipelineError::internal(format!("pass 2 panicked: {e}")))?;

        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // --- Passes 3-5 (CALLS/USAGE/USES_TYPE/THROWS/RAISES/CONFIGURES):
        // parallel resolvers, single-writer flush, in file-list order.
        let empty_type_map: crate::application::ports::TypeMap = HashMap::new();
        let empty_receiver_map: crate::application::ports::TypeMap = HashMap::new();
        let backend3 = self.backend.clone();
        let registry3 = registry.clone();
        let import_maps3 = import_maps.clone();
        let type_maps3 = type_maps.clone();
        let env_index3 = env_index.clone();
        let project3 = project.to_string();
        let resolve_paths: Vec<PathBuf> = loaded.iter().map(|f| f.rel_path.clone()).collect();

        let resolved: Vec<(PathBuf, Vec<ResolvedEdge>)> = tokio::task::spawn_blocking(move || {
                resolve_paths
                    .par_iter()
                    .map(|rel_path| {
                        let module_qn = crate::domain::module_qualified_name(&project3, rel_path);
                        let import_map = import_maps3.get(&module_qn).cloned().unwrap_or_default();
                        let type_map = type_maps3.get(rel_path).unwrap_or(&empty_type_map);
                        let ctx = ResolveCtx {
                            project: &project3,
                            file_path: rel_path,
                            module_qn: &module_qn,
                            registry: registry3.as_ref(),
                            import_map: &import_map,
                            type_map,
                            receiver_map: &empty_receiver_map,
                            env_index: &env_index3,
                        };
                        let edges = backend3.resolve(&ctx);
                        (rel_path.clone(), edges)
                })
                    .collect::<Vec<_>>()
        })
            .await
            .map_err(|e| PipelineError::internal(format!("resolution passes panicked: {e}")))?;

        for (rel_path, edges) in resolved {
            for resolved_edge in edges {
                if let Some(edge) = self.flush_resolved_edge(project, &resolved_edge).await? {
                    self.store.insert_edge(edge).await?;
                    outcome.edges_inserted += 1;
                } else {
                    debug!(
                        file = %rel_path.display(),
                        caller = %resolved_edge.caller_qn,
                        target = %resolved_edge.target_qn,
                        "unresolved edge endpoint, dropped"
                    );
                }
            }
        }

        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // --- Pass INHERITS: sequential, cheap.
        outcome.edges_inserted += self.run_inherits_pass(project, &import_maps).await?;

        // --- Pass IMPLEMENTS + OVERRIDE.
        outcome.edges_inserted += self.run_implements_pass(project).await?;

        // --- Enrichment: decorator tags, file symbol summaries.
        self.run_enrichment(project).await?;

        // --- Git-history coupling: last stage, independent of
        // everything else the run produced except the File nodes pass 1
        // already upserted. A repo with no analyser wired in, or one that
        // isn't under version control, simply skips this.
        if let Some(history) = &self.history {
            outcome.edges_inserted += self.run_history_pass(project, project_root, history.as_ref()).await?;
        }

        info!(
            files = outcome.files_processed,
            skipped = outcome.files_skipped,
            nodes = outcome.nodes_upserted,
            edges = outcome.edges_inserted,
            "pipeline run complete"
        );

        Ok(outcome)
    }

    /// Incremental re-index: deletes prior nodes for the changed
    /// files, then re-runs the full pass sequence restricted to them. The
    /// registry is rebuilt from the store's existing node index first so
    /// cross-file resolution still sees unchanged files.
    pub async fn reindex(
        &self,
        project: &str,
        project_root: &Path,
        changed_files: &[PathBuf],
        cancellation: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        for rel_path in changed_files {
            self.store
                .delete_file_nodes(project, &rel_path.to_string_lossy())
                .await?;
        }
        self.run(project, project_root, changed_files, cancellation).await
    }

    async fn flush_resolved_edge(
        &self,
        project: &str,
        resolved: &ResolvedEdge,
    ) -> Result<Option<Edge>, PipelineError> {
        let source = self.store.find_node_by_qn(project, &resolved.caller_qn).await?;
        let target = self.store.find_node_by_qn(project, &resolved.target_qn).await?;
        match (source, target) {
            (Some(s), Some(t)) => {
                let mut edge = Edge::new(project, s.id().unwrap_or_default(), t.id().unwrap_or_default(), resolved.edge_type);
                edge.properties = resolved.properties.clone();
                Ok(Some(edge))
            }
            _ => Ok(None),
        }
    }

    async fn build_env_index(&self, project: &str) -> Result<HashMap<String, String>, PipelineError> {
        let mut index = HashMap::new();
        for module in self.store.find_nodes_by_label(project, NodeLabel::Module).await? {
            let constants = module.property_str_list("constants");
            for entry in constants {
                if let Some((key, _value)) = entry.split_once(" = ") {
                    if looks_like_env_key(key) {
                        index.entry(key.to_string()).or_insert_with(|| module.qualified_name.clone());
                    }
                }
            }
        }
        Ok(index)
    }

    async fn run_inherits_pass(
        &self,
        project: &str,
        import_maps: &HashMap<String, HashMap<String, String>>,
    ) -> Result<usize, PipelineError> {
        let mut inserted = 0;
        let class_like = [
            NodeLabel::Class,
            NodeLabel::Type,
            NodeLabel::Interface,
            NodeLabel::Enum,
        ];
        let registry = self.rebuild_registry_view(project).await?;
        for label in class_like {
            for node in self.store.find_nodes_by_label(project, label).await? {
                let bases = node.property_str_list("base_classes");
                if bases.is_empty() {
                    continue;
                }
                let module_qn = crate::domain::module_qualified_name(project, Path::new(&node.file_path));
                let import_map = import_maps.get(&module_qn).cloned().unwrap_or_default();
                let Some(source_id) = node.id() else { continue };
                for base in bases {
                    if let Some(target_qn) =
                    registry.resolve_as_class(&base, &module_qn, &import_map)
                    {
                        if let Some(target) = self.store.find_node_by_qn(project, &target_qn).await? {
                            if let Some(target_id) = target.id() {
                                self.store
                                    .insert_edge(Edge::new(project, source_id, target_id, EdgeType::Inherits))
                                    .await?;
                                inserted += 1;
                            }
                        }
                    }
                }
            }
        }
        Ok(inserted)
    }

    async fn run_implements_pass(&self, project: &str) -> Result<usize, PipelineError> {
        let mut inserted = 0;

        // Interface id + method_name -> method_id, Go files only.
        struct IfaceInfo {
            id: i64,
            methods: HashMap<String, i64>,
        }
        let mut interfaces: Vec<IfaceInfo> = Vec::new();
        for iface in self.store.find_nodes_by_label(project, NodeLabel::Interface).await? {
            if !iface.file_path.ends_with(".go") {
                continue;
            }
            let Some(iface_id) = iface.id() else { continue };
            let mut methods = HashMap::new();
            for edge in self
                .store
                .find_edges_by_source_and_type(iface_id, EdgeType::DefinesMethod)
                .await?
            {
                if let Some(method) = self.store.find_node_by_id(edge.target_id).await? {
                    if let Some(id) = method.id() {
                        methods.insert(method.name.clone(), id);
                    }
                }
            }
            interfaces.push(IfaceInfo {
                    id: iface_id,
                    methods,
            });
        }

        // type_name -> {method_name -> (method_qn, method_id)}, from receiver properties.
        let mut type_methods: HashMap<String, HashMap<String, (String, i64)>> = HashMap::new();
        for method in self.store.find_nodes_by_label(project, NodeLabel::Method).await? {
            let Some(receiver) = method.property_str("receiver") else { continue };
            let Some(type_name) = parse_receiver_type(receiver) else { continue };
            let Some(method_id) = method.id() else { continue };
            type_methods
                .entry(type_name)
                .or_default()
                .insert(method.name.clone(), (method.qualified_name.clone(), method_id));
        }

        for iface in &interfaces {
            if iface.methods.is_empty() {
                continue;
            }
            for (type_name, methods) in &type_methods {
                let have: std::collections::HashSet<&String> = methods.keys().collect();
                if !iface.methods.keys().all(|m| have.contains(m)) {
                    continue;
                }
                let Some(class_node) = self.find_go_type_node(project, type_name).await? else {
                    continue;
                };
                let Some(class_id) = class_node.id() else { continue };

                self.store
                    .insert_edge(Edge::new(project, class_id, iface.id, EdgeType::Implements))
                    .await?;
                inserted += 1;

                for (method_name, iface_method_id) in &iface.methods {
                    if let Some((_, class_method_id)) = methods.get(method_name) {
                        self.store
                            .insert_edge(Edge::new(
                                project,
                                *class_method_id,
                                *iface_method_id,
                                EdgeType::Override,
                        ))
                            .await?;
                        inserted += 1;
                    }
                }
            }
        }
        Ok(inserted)
    }

    async fn find_go_type_node(&self, project: &str, type_name: &str) -> Result<Option<crate::domain::Node>, PipelineError> {
        for node in self.store.find_nodes_by_name(project, type_name).await? {
            if node.label == NodeLabel::Class && node.file_path.ends_with(".go") {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    async fn run_enrichment(&self, project: &str) -> Result<(), PipelineError> {
        // Decorator tags.
        let mut frequency: HashMap<String, usize> = HashMap::new();
        let mut tagged: Vec<(crate::domain::Node, Vec<String>)> = Vec::new();
        for label in [NodeLabel::Function, NodeLabel::Method] {
            for node in self.store.find_nodes_by_label(project, label).await? {
                let decorators = node.property_str_list("decorators");
                let tokens = tokenise_decorators(&decorators);
                for t in &tokens {
                    *frequency.entry(t.clone()).or_insert(0) += 1;
                }
                tagged.push((node, tokens));
            }
        }
        for (mut node, tokens) in tagged {
            let tags: Vec<String> = tokens
                .into_iter()
                .filter(|t| frequency.get(t).copied().unwrap_or(0) >= self.config.decorator_tag_min_frequency)
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();
            if tags.is_empty() {
                continue;
            }
            node.properties
                .insert("decorator_tags".to_string(), serde_json::json!(tags));
            self.store.upsert_node(node).await?;
        }

        // File symbol summaries.
        for file_node in self.store.find_nodes_by_label(project, NodeLabel::File).await? {
            let mut symbols = Vec::new();
            for node in self.store.find_nodes_by_file(project, &file_node.file_path).await? {
                if matches!(node.label, NodeLabel::File | NodeLabel::Module) {
                    continue;
                }
                symbols.push(format!("{}:{}", node.label.symbol_prefix(), node.name));
            }
            let mut file_node = file_node;
            file_node
                .properties
                .insert("symbols".to_string(), serde_json::json!(symbols));
            self.store.upsert_node(file_node).await?;
        }
        Ok(())
    }

    /// Git-history coupling: scores co-changing file pairs over the
    /// analyser's window and emits one FILE_CHANGES_WITH edge per kept
    /// pair. A pair whose File node on either side was never indexed (the
    /// analyser works from `git log`, not from the discovered-file list)
    /// produces no edge — same "unresolved endpoint, drop it" rule the
    /// resolution passes use.
    async fn run_history_pass(
        &self,
        project: &str,
        project_root: &Path,
        history: &dyn HistoryAnalyser,
    ) -> Result<usize, PipelineError> {
        let pairs = history.analyse(project_root, &self.config)?;
        let mut inserted = 0;
        for pair in pairs {
            let a = self.find_file_node(project, &pair.file_a).await?;
            let b = self.find_file_node(project, &pair.file_b).await?;
            let (Some(a), Some(b)) = (a, b) else { continue };
            let (Some(a_id), Some(b_id)) = (a.id(), b.id()) else { continue };
            let edge = Edge::new(project, a_id, b_id, EdgeType::FileChangesWith)
                .with_property("co_change_count", pair.co_change_count)
                .with_property("total_changes_a", pair.total_changes_a)
                .with_property("total_changes_b", pair.total_changes_b)
                .with_property("coupling_score", pair.coupling_score);
            self.store.insert_edge(edge).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_file_node(&self, project: &str, rel_path: &str) -> Result<Option<Node>, PipelineError> {
        for node in self.store.find_nodes_by_file(project, rel_path).await? {
            if node.label == NodeLabel::File {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Rebuilds a throwaway registry view from the store's current node
    /// index (used by `run_inherits_pass`, and by `reindex`, which rebuilds
    /// the registry from the store's node index before resolution).
    async fn rebuild_registry_view(&self, project: &str) -> Result<SymbolRegistry, PipelineError> {
        let mut builder = SymbolRegistryBuilder::new();
        for label in [
            NodeLabel::Module,
            NodeLabel::Class,
            NodeLabel::Interface,
            NodeLabel::Enum,
            NodeLabel::Type,
            NodeLabel::Function,
            NodeLabel::Method,
            NodeLabel::Variable,
            NodeLabel::Macro,
            NodeLabel::Field,
        ] {
            for node in self.store.find_nodes_by_label(project, label).await? {
                builder.register(&node.name, &node.qualified_name, node.label);
            }
        }
        Ok(builder.seal())
    }
}

fn strip_bom(mut bytes: Vec<u8>) -> Vec<u8> {
    const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    if bytes.len() >= 3 && bytes[0..3] == BOM {
        bytes.drain(0..3);
    }
    bytes
}

/// Parses a Go receiver's type name out of text like `(m *Mux)` or `(h
/// Handlers)`: take the last whitespace-delimited token, strip a
/// leading `*` and the trailing `)`.
fn parse_receiver_type(receiver: &str) -> Option<String> {
    let inner = receiver.trim().trim_start_matches('(').trim_end_matches(')');
    let last = inner.split_whitespace().last()?;
    Some(last.trim_start_matches('*').to_string())
}

/// Tokenises decorator literals: strip markup, split on separators
/// and camelCase boundaries, lowercase, drop stopwords and short tokens.
fn tokenise_decorators(decorators: &[String]) -> Vec<String> {
    const STOPWORDS: &[&str] = &[
        "get", "set", "new", "class", "method", "function", "value", "type", "param", "return",
        "public", "private", "for", "if", "the", "and", "or", "not", "with", "from", "app",
        "router",
    ];
    let mut tokens = Vec::new();
    for decorator in decorators {
        let cleaned = decorator
            .trim_start_matches('@')
            .trim_start_matches("#[")
            .trim_end_matches(']');
        let cleaned = match cleaned.find('(') {
            Some(idx) => &cleaned[..idx],
            None => cleaned,
        };
        let mut current = String::new();
        let mut pieces = Vec::new();
        for c in cleaned.chars() {
            if c == '.' || c == '_' || c == '-' || c == ':' || c == '/' {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                continue;
            }
            if c.is_uppercase() && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        for piece in pieces {
            let lower = piece.to_lowercase();
            if lower.len() < 2 || STOPWORDS.contains(&lower.as_str()) {
                continue;
            }
            tokens.push(lower);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"fn main() {}");
        let stripped = strip_bom(bytes);
        assert_eq!(stripped, b"fn main() {}");
    }

    #[test]
    fn no_bom_is_untouched() {
        let bytes = b"fn main() {}".to_vec();
        assert_eq!(strip_bom(bytes.clone()), bytes);
    }

    #[test]
    fn receiver_type_strips_pointer_and_parens() {
        assert_eq!(parse_receiver_type("(m *Mux)"), Some("Mux".to_string()));
        assert_eq!(parse_receiver_type("(h Handlers)"), Some("Handlers".to_string()));
    }

    #[test]
    fn tokenise_splits_camel_case_and_drops_stopwords() {
        let tokens = tokenise_decorators(&["@GetMapping(\"/orders\")".to_string()]);
        assert_eq!(tokens, vec!["mapping".to_string()]);
    }
}
