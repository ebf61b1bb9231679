pub mod core;
pub mod codec;
pub mod index;
pub mod mmap;
pub mod search;
pub mod api;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                          LODESTORE STRUCT ARCHITECTURE                        │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── CORE LAYER ─────────────────────────────────┐
│                                                                               │
│  ┌─────────────────────────────────────────────────────────────────────┐    │
│  │                           struct Store                               │    │
│  │  ┌───────────────────────────────────────────────────────────────┐ │    │
│  │  │ options: StoreOptions          // Sizing + sync cadence       │ │    │
│  │  │ codec: DocumentCodec           // Map <-> byte block          │ │    │
│  │  │ indexes: IndexManager          // Per-field index families    │ │    │
│  │  │ inner: RwLock<StoreInner>      // data + region + dirty       │ │    │
│  │  │ stats: Mutex<StoreStats>       // Counters + EWMA latencies   │ │    │
│  │  │ cleanup_tx/rx: channel<String> // Lazy-expiry queue           │ │    │
│  │  │ shutdown_tx + maintenance      // Periodic sync/GC thread     │ │    │
│  │  └───────────────────────────────────────────────────────────────┘ │    │
│  └─────────────────────────────────────────────────────────────────────┘    │
│                                                                               │
│  ┌──────────────────┐  ┌──────────────────────┐  ┌──────────────────────┐   │
│  │ struct Entry     │  │ enum Value           │  │ struct StoreOptions  │   │
│  │ • value: Value   │  │ • Null / Bool        │  │ • initial_size       │   │
│  │ • timestamp: i64 │  │ • Int / Float / Str  │  │ • max_size           │   │
│  │ • ttl: i64       │  │ • Seq / Map          │  │ • sync_interval      │   │
│  └──────────────────┘  └──────────────────────┘  │ • debug              │   │
│                                                   └──────────────────────┘   │
└───────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── INDEX LAYER ─────────────────────────────────┐
│                                                                               │
│  ┌─────────────────────────────────────────────────────────────────────┐    │
│  │                        struct IndexManager                           │    │
│  │  ┌───────────────────────────────────────────────────────────────┐ │    │
│  │  │ text: HashMap<field, TrigramIndex>   // Fuzzy text search     │ │    │
│  │  │ vectors: HashMap<field, VectorIndex> // Cosine similarity     │ │    │
│  │  │ ordered: HashMap<field, OrderedIndex>// Scalar equality       │ │    │
│  │  └───────────────────────────────────────────────────────────────┘ │    │
│  └─────────────────────────────────────────────────────────────────────┘    │
│                                                                               │
│  ┌──────────────────────┐  ┌─────────────────────┐  ┌────────────────────┐  │
│  │ struct TrigramIndex  │  │ struct VectorIndex  │  │ struct OrderedIndex│  │
│  │ • grams -> keys      │  │ • key -> unit vec   │  │ • (scalar, key)    │  │
│  │ • key -> text        │  │ • dim: usize        │  │ • key -> scalar    │  │
│  └──────────────────────┘  └─────────────────────┘  └────────────────────┘  │
└───────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── STORAGE LAYER ────────────────────────────────┐
│                                                                               │
│  ┌──────────────────────┐  ┌─────────────────────┐  ┌────────────────────┐  │
│  │ struct MmapRegion    │  │ struct DocumentCodec│  │ struct BufferPool  │  │
│  │ • mmap: MmapMut      │  │ • encode / decode   │  │ • size-class pools │  │
│  │ • grow: 2x doubling  │  │ • pooled buffers    │  │                    │  │
│  │ • content_size: NUL  │  └─────────────────────┘  └────────────────────┘  │
│  └──────────────────────┘                                                    │
└───────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── SEARCH LAYER ────────────────────────────────┐
│                                                                               │
│  ┌──────────────────────┐  ┌─────────────────────────────────────────────┐  │
│  │ struct SearchQuery   │  │ Store::search (planner)                     │  │
│  │ • text / vector      │  │ text hits + vector hits -> merged by key    │  │
│  │ • filters            │  │ -> filter set retained -> values attached   │  │
│  │ • max_results        │  │ -> ranked by combined_score desc            │  │
│  │ • min_score          │  └─────────────────────────────────────────────┘  │
│  └──────────────────────┘                                                    │
└───────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── RELATIONSHIPS ──────────────────────────────┐
│                                                                               │
│  Store ──owns──> IndexManager ──owns──> Trigram/Vector/Ordered indexes       │
│    │                                                                          │
│    ├──owns──> MmapRegion <──encodes into── DocumentCodec                     │
│    │                                                                          │
│    └──spawns──> maintenance thread ──ticks──> sync + cleanup queue + GC      │
│                                                                               │
│  api::build_router ──routes──> Store::{get,set,delete,search,sync,stats}     │
│                                                                               │
└───────────────────────────────────────────────────────────────────────────────┘
*/
