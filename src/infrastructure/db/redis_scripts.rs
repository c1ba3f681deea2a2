//! Lua scripts for the document store. Redis runs each one atomically.

/// KEYS: names hash, doc key, ids zset. ARGV: index field, id, document.
/// Returns 1 when stored, 0 when the unique slot is taken.
pub const INSERT: &str = r#"
if redis.call('HSETNX', KEYS[1], ARGV[1], ARGV[2]) == 0 then
  return 0
end
redis.call('SET', KEYS[2], ARGV[3])
redis.call('ZADD', KEYS[3], 0, ARGV[2])
return 1
"#;

/// KEYS: doc key, ids zset, names hash. ARGV: owner, id, then the unique
/// field names. Returns the removed document, or nil when missing or foreign.
pub const DELETE: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return false
end
local doc = cjson.decode(raw)
if doc.owner ~= ARGV[1] then
  return false
end
redis.call('DEL', KEYS[1])
redis.call('ZREM', KEYS[2], ARGV[2])
local parts = {}
for i = 3, #ARGV do
  parts[#parts + 1] = doc[ARGV[i]]
end
local field = table.concat(parts, '\0')
if redis.call('HGET', KEYS[3], field) == ARGV[2] then
  redis.call('HDEL', KEYS[3], field)
end
return raw
"#;

/// KEYS: ids zset, names hash. ARGV: doc key prefix.
/// Returns how many documents were removed.
pub const DELETE_ALL: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, -1)
for _, id in ipairs(ids) do
  redis.call('DEL', ARGV[1] .. id)
end
redis.call('DEL', KEYS[1], KEYS[2])
return #ids
"#;

/// KEYS: doc key, names hash. ARGV: owner, id, the number n of unique
/// fields, their n names, then field/value pairs.
/// Returns 1 when applied, 0 when missing or foreign, -1 on a key clash.
pub const UPDATE: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 0
end
local doc = cjson.decode(raw)
if doc.owner ~= ARGV[1] then
  return 0
end
local n = tonumber(ARGV[3])
local function index_field()
  local parts = {}
  for i = 4, 3 + n do
    parts[#parts + 1] = doc[ARGV[i]]
  end
  return table.concat(parts, '\0')
end
local old_field = index_field()
for i = 4 + n, #ARGV, 2 do
  doc[ARGV[i]] = ARGV[i + 1]
end
local new_field = index_field()
if new_field ~= old_field then
  if redis.call('HSETNX', KEYS[2], new_field, ARGV[2]) == 0 then
    return -1
  end
  redis.call('HDEL', KEYS[2], old_field)
end
redis.call('SET', KEYS[1], cjson.encode(doc))
return 1
"#;
